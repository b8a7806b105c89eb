//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::NondisclosureService;
use crate::config::Settings;
use crate::infrastructure::fragments::FsFragmentRepository;
use crate::infrastructure::traits::{FileSystem, FragmentRepository, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Fragment source
    pub fragments: Arc<dyn FragmentRepository>,

    pub nondisclosure: NondisclosureService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// Fragments are read from `settings.fragments_dir`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let fragments = Arc::new(FsFragmentRepository::new(
            settings.fragments_dir.clone(),
            fs.clone(),
        ));
        Self::with_deps(settings, fs, fragments)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        fragments: Arc<dyn FragmentRepository>,
    ) -> Self {
        let settings = Arc::new(settings);
        let nondisclosure =
            NondisclosureService::new(fragments.clone(), settings.nondisclosure.clone());

        Self {
            settings,
            fs,
            fragments,
            nondisclosure,
        }
    }
}
