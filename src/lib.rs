pub use clinic_core::*;

pub mod fs {
    pub use clinic_fs::*;
}

#[cfg(feature = "google")]
pub mod google {
    pub use clinic_google::*;
}

#[cfg(feature = "sync")]
pub mod sync {
    pub use clinic_sync::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use clinic_store_mock::*;
}

pub mod prelude {
    pub use clinic_core::prelude::*;
    pub use clinic_fs::{LocalDir, read_announcements};

    #[cfg(feature = "google")]
    pub use clinic_google::{GoogleSession, GoogleStore, ServiceAccountCredentials};

    #[cfg(feature = "sync")]
    pub use clinic_sync::{Preflight, SiteLayout, SyncConfig, SyncReport, preflight, run_sync};

    #[cfg(feature = "mock")]
    pub use clinic_store_mock::MemoryStore;
}
