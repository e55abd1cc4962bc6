mod minigame;
mod offline;
mod rates;
mod resource_store;
mod scheduler;
mod state;
mod tick;

pub use minigame::{MinigameId, MinigameRecord, insert_score};
pub use offline::{
    OfflineProgress, OfflineProgressResult, apply_offline_progress, calculate_offline_progress,
};
pub use rates::{
    GenerationBreakdown, calculate_generation_over_time, current_rate, generation_breakdown,
    generation_rates,
};
pub use resource_store::{Balance, Resource, ResourceAmounts, ResourceLedger};
pub use scheduler::{Clock, FrameHandle, ManualClock, ManualScheduler, Scheduler, SystemClock};
pub use state::{DEFAULT_PLAYER_NAME, GameState, Settings, Stats};
pub use tick::{
    DisplayUpdate, FrameReport, SubscriptionId, TickCommand, TickEngine, TickState,
};
