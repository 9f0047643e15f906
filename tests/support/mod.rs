// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, application fixtures and actor construction for integration tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Once};

use cfpush::config::{FlagOverrides, Manifest};
use cfpush::platform::InMemoryPlatform;
use cfpush::push::{PushActor, PushPlan};
use cfpush::resources::LocalResources;
use cfpush::types::{OrgGuid, SpaceGuid};
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

pub type Actor = PushActor<InMemoryPlatform, LocalResources>;

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("cfpush=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A small application directory with a nested file and an empty one.
#[allow(dead_code)]
pub fn app_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Procfile"), "web: ./server\n").unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib").join("server.rb"), "puts 'hi'\n").unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();
    dir
}

/// A directory holding only empty files.
#[allow(dead_code)]
pub fn empty_files_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("placeholder"), "").unwrap();
    dir
}

#[allow(dead_code)]
pub fn actor(platform: InMemoryPlatform) -> Actor {
    init_tracing();
    PushActor::new(Arc::new(platform), Arc::new(LocalResources::new()))
}

/// Plan a push of `name` from `path` with no manifest.
#[allow(dead_code)]
pub fn bits_plan(actor: &Actor, name: &str, path: &Path) -> PushPlan {
    let overrides = FlagOverrides {
        provided_app_path: Some(path.to_path_buf()),
        ..FlagOverrides::default()
    };
    plan_with(actor, name, &overrides)
}

#[allow(dead_code)]
pub fn plan_with(actor: &Actor, name: &str, overrides: &FlagOverrides) -> PushPlan {
    let mut plans = actor
        .create_push_plans(
            Some(name),
            &SpaceGuid::new("space-1"),
            &OrgGuid::new("org-1"),
            &Manifest::default(),
            overrides,
        )
        .unwrap();
    assert_eq!(plans.len(), 1);
    plans.remove(0)
}

/// Resolve a single plan against the actor's platform.
#[allow(dead_code)]
pub async fn resolve(actor: &Actor, plan: PushPlan) -> PushPlan {
    let mut warnings = cfpush::warnings::Warnings::new();
    let mut plans = actor
        .resolve_applications(vec![plan], &mut warnings)
        .await
        .unwrap();
    plans.remove(0)
}
