pub mod core;
pub mod data;
pub mod decimal;
pub mod economy;
pub mod save;
pub mod session;

pub use self::core::{
    Clock, DisplayUpdate, FrameHandle, FrameReport, GameState, GenerationBreakdown, ManualClock,
    ManualScheduler, MinigameId, MinigameRecord, OfflineProgress, OfflineProgressResult,
    Resource, ResourceAmounts, ResourceLedger, Scheduler, SubscriptionId, SystemClock,
    TickEngine, TickState, calculate_generation_over_time, calculate_offline_progress,
    insert_score,
};
pub use data::{
    Automation, EngineConfig, Rules, UpgradeCatalog, UpgradeDefinition, load_config_from_path,
    load_config_from_str,
};
pub use decimal::{Decimal, DecimalError};
pub use economy::{
    PurchaseError, UpgradeDisplayInfo, calculate_affordable_levels, calculate_bulk_cost,
    calculate_cost, purchase,
};
pub use save::{
    FileStorage, MemoryStorage, SaveError, SaveSlotMetadata, SaveSnapshot, SaveStorage,
    SaveSystem, export_to_base64, import_from_base64, load_from_json_string,
    save_to_json_string,
};
pub use session::GameSession;
