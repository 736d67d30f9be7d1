/// JSON backup export and import.
pub mod backup;
/// Contest, entrant and score operations.
pub mod contest_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// CSV and backup downloads plus backup restore.
pub mod export_service;
/// Health check service.
pub mod health_service;
/// Leaderboard ordering and CSV rendering.
pub mod leaderboard;
/// Debounced persistence of scoreboard snapshots.
pub mod save_scheduler;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
