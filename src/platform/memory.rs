// ABOUTME: In-memory platform that records calls and replays scripted failures.
// ABOUTME: Backs push rehearsals and the test suite without any network access.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use super::traits::{
    AppOps, DeploymentOps, DropletOps, InstanceDetailsSender, PackageOps, ProcessOps, RouteOps,
    SpaceOps,
};
use super::{
    ApiError, Application, ApplicationState, ArchiveUpload, Build, DeploymentRequest,
    DockerCredentials, Domain, Droplet, Outcome, Package, PackageState, ProcessScale,
    ProcessUpdate, Route,
};
use crate::resources::Resource;
use crate::types::{
    AppGuid, AppName, BuildGuid, DeploymentGuid, DomainGuid, DropletGuid, Guid, OrgGuid,
    PackageGuid, RouteGuid, SpaceGuid,
};
use crate::warnings::Warnings;

/// Platform operations, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetApplication,
    CreateApplication,
    UpdateApplication,
    StopApplication,
    RestartApplication,
    PollStart,
    SetApplicationDroplet,
    ResourceMatch,
    CreateBitsPackage,
    CreateDockerPackage,
    UploadBitsPackage,
    PollPackage,
    StagePackage,
    PollBuild,
    CreateDroplet,
    UploadDroplet,
    ScaleWebProcess,
    UpdateWebProcess,
    GetDefaultDomain,
    GetApplicationRoutes,
    GetRoute,
    CreateRoute,
    MapRoute,
    CreateDeployment,
    PollDeployment,
    SetSpaceManifest,
}

/// What one upload call received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub matched: usize,
    /// Bytes read from the archive, `None` when no archive was sent.
    pub archive_bytes: Option<u64>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    apps: HashMap<String, Application>,
    current_droplets: HashMap<AppGuid, DropletGuid>,
    routes: Vec<Route>,
    mappings: Vec<(RouteGuid, AppGuid)>,
    known_checksums: HashSet<String>,
    failures: HashMap<Operation, VecDeque<ApiError>>,
    warnings: HashMap<Operation, Vec<String>>,
    stalls: HashMap<Operation, Duration>,
    instance_details: Vec<String>,
    default_domain: Option<Domain>,
    calls: Vec<Operation>,
    uploads: Vec<UploadRecord>,
    deployments: Vec<DeploymentRequest>,
    scales: Vec<ProcessScale>,
    process_updates: Vec<ProcessUpdate>,
    space_manifests: Vec<(SpaceGuid, Vec<u8>)>,
}

impl State {
    fn next_guid<T>(&mut self, prefix: &str) -> Guid<T> {
        self.next_id += 1;
        Guid::new(format!("{}-{:04}", prefix, self.next_id))
    }

    /// Record the call and hand back its scripted failure and warnings.
    fn enter(&mut self, op: Operation) -> (Option<ApiError>, Warnings) {
        self.calls.push(op);
        let failure = self.failures.get_mut(&op).and_then(VecDeque::pop_front);
        let warnings = self
            .warnings
            .get(&op)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default();
        (failure, warnings)
    }

    fn app_by_guid_mut(&mut self, guid: &AppGuid) -> Option<&mut Application> {
        self.apps.values_mut().find(|app| &app.guid == guid)
    }
}

/// A platform that lives entirely in memory.
///
/// Every call is appended to a log. Failures scripted with [`fail_next`]
/// are returned in order by the matching operation, and warnings scripted
/// with [`warn_on`] are attached to every call of that operation.
///
/// [`fail_next`]: InMemoryPlatform::fail_next
/// [`warn_on`]: InMemoryPlatform::warn_on
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlatform {
    state: Arc<Mutex<State>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an application that already exists on the platform.
    pub fn with_application(self, name: &AppName, state: ApplicationState) -> Self {
        {
            let mut s = self.state.lock();
            let guid = s.next_guid("app");
            s.apps.insert(
                name.as_str().to_string(),
                Application {
                    name: name.clone(),
                    guid,
                    state,
                    ..Application::default()
                },
            );
        }
        self
    }

    /// Seed a route already mapped to `name`, which must have been seeded.
    pub fn with_mapped_route(self, name: &AppName, host: &str) -> Self {
        {
            let mut s = self.state.lock();
            let guid = seed_route(&mut s, host);
            if let Some(app) = s.apps.get(name.as_str()).map(|a| a.guid.clone()) {
                s.mappings.push((guid, app));
            }
        }
        self
    }

    /// Seed a route on the default domain that nothing is mapped to.
    pub fn with_route(self, host: &str) -> Self {
        seed_route(&mut self.state.lock(), host);
        self
    }

    /// Checksums the platform already stores and will report as matched.
    pub fn with_known_checksums<I, S>(self, checksums: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .known_checksums
            .extend(checksums.into_iter().map(Into::into));
        self
    }

    pub fn with_default_domain(self, name: &str) -> Self {
        {
            let mut s = self.state.lock();
            let guid: DomainGuid = s.next_guid("domain");
            s.default_domain = Some(Domain {
                guid,
                name: name.to_string(),
            });
        }
        self
    }

    /// Status lines reported while polling for startup or deployment.
    pub fn with_instance_details<I, S>(self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .instance_details
            .extend(details.into_iter().map(Into::into));
        self
    }

    /// Make the next call of `op` fail with `error`. Queues on repeat.
    pub fn fail_next(&self, op: Operation, error: ApiError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Attach `warning` to every call of `op`.
    pub fn warn_on(&self, op: Operation, warning: impl Into<String>) {
        self.state
            .lock()
            .warnings
            .entry(op)
            .or_default()
            .push(warning.into());
    }

    /// Hold every later poll of `op` for `delay` before it answers.
    ///
    /// Only the polling operations (build, start, deployment) honour this.
    pub fn stall(&self, op: Operation, delay: Duration) {
        self.state.lock().stalls.insert(op, delay);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.state.lock().uploads.clone()
    }

    pub fn deployments(&self) -> Vec<DeploymentRequest> {
        self.state.lock().deployments.clone()
    }

    pub fn scales(&self) -> Vec<ProcessScale> {
        self.state.lock().scales.clone()
    }

    pub fn process_updates(&self) -> Vec<ProcessUpdate> {
        self.state.lock().process_updates.clone()
    }

    /// Manifests applied so far, with the space each went to.
    pub fn space_manifests(&self) -> Vec<(SpaceGuid, Vec<u8>)> {
        self.state.lock().space_manifests.clone()
    }

    pub fn application(&self, name: &str) -> Option<Application> {
        self.state.lock().apps.get(name).cloned()
    }

    pub fn current_droplet(&self, app: &AppGuid) -> Option<DropletGuid> {
        self.state.lock().current_droplets.get(app).cloned()
    }

    /// Routes mapped to the named application, as `host.domain/path`.
    pub fn mapped_urls(&self, name: &str) -> Vec<String> {
        let s = self.state.lock();
        let Some(app) = s.apps.get(name) else {
            return Vec::new();
        };
        s.mappings
            .iter()
            .filter(|(_, guid)| guid == &app.guid)
            .filter_map(|(route, _)| s.routes.iter().find(|r| &r.guid == route))
            .map(Route::url)
            .collect()
    }

    /// Let the caller run, then sit out any scripted stall for `op`.
    async fn settle(&self, op: Operation) {
        tokio::task::yield_now().await;
        let stall = self.state.lock().stalls.get(&op).copied();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
    }

    fn report_details(&self, details: &InstanceDetailsSender) {
        let lines = self.state.lock().instance_details.clone();
        for line in lines {
            // Receiver gone means nobody is listening anymore.
            let _ = details.send(line);
        }
    }
}

fn default_domain(state: &mut State) -> Domain {
    if let Some(domain) = &state.default_domain {
        return domain.clone();
    }
    let guid: DomainGuid = state.next_guid("domain");
    let domain = Domain {
        guid,
        name: "apps.internal".to_string(),
    };
    state.default_domain = Some(domain.clone());
    domain
}

fn seed_route(state: &mut State, host: &str) -> RouteGuid {
    let domain = default_domain(state);
    let guid: RouteGuid = state.next_guid("route");
    state.routes.push(Route {
        guid: guid.clone(),
        host: host.to_string(),
        domain,
        path: String::new(),
    });
    guid
}

fn drain(reader: &mut dyn Read) -> u64 {
    std::io::copy(reader, &mut std::io::sink()).unwrap_or(0)
}

macro_rules! scripted {
    ($warnings:expr, $failure:expr) => {
        if let Some(error) = $failure {
            return Outcome::err(error).with_warnings($warnings);
        }
    };
}

#[async_trait]
impl AppOps for InMemoryPlatform {
    async fn get_application_by_name(
        &self,
        name: &AppName,
        _space: &SpaceGuid,
    ) -> Outcome<Application> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::GetApplication);
        scripted!(warnings, failure);
        match s.apps.get(name.as_str()) {
            Some(app) => Outcome::ok(app.clone()),
            None => Outcome::err(ApiError::ApplicationNotFound(name.to_string())),
        }
        .with_warnings(warnings)
    }

    async fn create_application(
        &self,
        app: &Application,
        _space: &SpaceGuid,
    ) -> Outcome<Application> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateApplication);
        scripted!(warnings, failure);
        if s.apps.contains_key(app.name.as_str()) {
            return Outcome::err(ApiError::ApplicationAlreadyExists(app.name.to_string()))
                .with_warnings(warnings);
        }
        let created = Application {
            guid: s.next_guid("app"),
            state: ApplicationState::Stopped,
            ..app.clone()
        };
        s.apps
            .insert(created.name.as_str().to_string(), created.clone());
        Outcome::ok(created).with_warnings(warnings)
    }

    async fn update_application(&self, app: &Application) -> Outcome<Application> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::UpdateApplication);
        scripted!(warnings, failure);
        match s.app_by_guid_mut(&app.guid) {
            Some(existing) => {
                existing.buildpacks = app.buildpacks.clone();
                existing.stack = app.stack.clone();
                existing.lifecycle = app.lifecycle;
                Outcome::ok(existing.clone())
            }
            None => Outcome::err(ApiError::ApplicationNotFound(app.name.to_string())),
        }
        .with_warnings(warnings)
    }

    async fn stop_application(&self, app: &AppGuid) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::StopApplication);
        scripted!(warnings, failure);
        if let Some(existing) = s.app_by_guid_mut(app) {
            existing.state = ApplicationState::Stopped;
        }
        Outcome::ok(()).with_warnings(warnings)
    }

    async fn restart_application(&self, app: &AppGuid, _no_wait: bool) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::RestartApplication);
        scripted!(warnings, failure);
        if let Some(existing) = s.app_by_guid_mut(app) {
            existing.state = ApplicationState::Started;
        }
        Outcome::ok(()).with_warnings(warnings)
    }

    async fn poll_start(
        &self,
        _app: &Application,
        _no_wait: bool,
        details: InstanceDetailsSender,
    ) -> Outcome<()> {
        let (failure, warnings) = self.state.lock().enter(Operation::PollStart);
        self.report_details(&details);
        self.settle(Operation::PollStart).await;
        scripted!(warnings, failure);
        Outcome::ok(()).with_warnings(warnings)
    }

    async fn set_application_droplet(&self, app: &AppGuid, droplet: &DropletGuid) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::SetApplicationDroplet);
        scripted!(warnings, failure);
        s.current_droplets.insert(app.clone(), droplet.clone());
        Outcome::ok(()).with_warnings(warnings)
    }
}

#[async_trait]
impl PackageOps for InMemoryPlatform {
    async fn resource_match(&self, resources: &[Resource]) -> Outcome<Vec<Resource>> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::ResourceMatch);
        scripted!(warnings, failure);
        let matched = resources
            .iter()
            .filter(|r| s.known_checksums.contains(&r.checksum))
            .cloned()
            .collect();
        Outcome::ok(matched).with_warnings(warnings)
    }

    async fn create_bits_package(&self, _app: &AppGuid) -> Outcome<Package> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateBitsPackage);
        scripted!(warnings, failure);
        let guid: PackageGuid = s.next_guid("package");
        Outcome::ok(Package {
            guid,
            state: PackageState::AwaitingUpload,
        })
        .with_warnings(warnings)
    }

    async fn create_docker_package(
        &self,
        _app: &AppGuid,
        _credentials: &DockerCredentials,
    ) -> Outcome<Package> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateDockerPackage);
        scripted!(warnings, failure);
        let guid: PackageGuid = s.next_guid("package");
        Outcome::ok(Package {
            guid,
            state: PackageState::Ready,
        })
        .with_warnings(warnings)
    }

    async fn upload_bits_package(
        &self,
        package: &Package,
        matched: &[Resource],
        archive: Option<ArchiveUpload>,
    ) -> Outcome<Package> {
        // Read the body first, like a transport would before failing mid-stream.
        let archive_bytes = archive.map(|mut upload| drain(&mut upload.reader));

        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::UploadBitsPackage);
        s.uploads.push(UploadRecord {
            matched: matched.len(),
            archive_bytes,
        });
        scripted!(warnings, failure);
        Outcome::ok(Package {
            guid: package.guid.clone(),
            state: PackageState::Processing,
        })
        .with_warnings(warnings)
    }

    async fn poll_package(&self, package: &Package) -> Outcome<Package> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::PollPackage);
        scripted!(warnings, failure);
        Outcome::ok(Package {
            guid: package.guid.clone(),
            state: PackageState::Ready,
        })
        .with_warnings(warnings)
    }
}

#[async_trait]
impl DropletOps for InMemoryPlatform {
    async fn stage_package(&self, package: &PackageGuid) -> Outcome<Build> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::StagePackage);
        scripted!(warnings, failure);
        let guid: BuildGuid = s.next_guid("build");
        Outcome::ok(Build {
            guid,
            package: package.clone(),
        })
        .with_warnings(warnings)
    }

    async fn poll_build(&self, _build: &BuildGuid, _app_name: &AppName) -> Outcome<Droplet> {
        let outcome = {
            let mut s = self.state.lock();
            let (failure, warnings) = s.enter(Operation::PollBuild);
            match failure {
                Some(error) => Outcome::err(error),
                None => Outcome::ok(Droplet {
                    guid: s.next_guid("droplet"),
                }),
            }
            .with_warnings(warnings)
        };
        self.settle(Operation::PollBuild).await;
        outcome
    }

    async fn create_droplet(&self, _app: &AppGuid) -> Outcome<Droplet> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateDroplet);
        scripted!(warnings, failure);
        Outcome::ok(Droplet {
            guid: s.next_guid("droplet"),
        })
        .with_warnings(warnings)
    }

    async fn upload_droplet(
        &self,
        _droplet: &DropletGuid,
        _app: &AppGuid,
        mut archive: ArchiveUpload,
    ) -> Outcome<()> {
        let bytes = drain(&mut archive.reader);

        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::UploadDroplet);
        s.uploads.push(UploadRecord {
            matched: 0,
            archive_bytes: Some(bytes),
        });
        scripted!(warnings, failure);
        Outcome::ok(()).with_warnings(warnings)
    }
}

#[async_trait]
impl ProcessOps for InMemoryPlatform {
    async fn scale_web_process(&self, _app: &AppGuid, scale: &ProcessScale) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::ScaleWebProcess);
        scripted!(warnings, failure);
        s.scales.push(*scale);
        Outcome::ok(()).with_warnings(warnings)
    }

    async fn update_web_process(&self, _app: &AppGuid, update: &ProcessUpdate) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::UpdateWebProcess);
        scripted!(warnings, failure);
        s.process_updates.push(update.clone());
        Outcome::ok(()).with_warnings(warnings)
    }
}

#[async_trait]
impl RouteOps for InMemoryPlatform {
    async fn get_default_domain(&self, _org: &OrgGuid) -> Outcome<Domain> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::GetDefaultDomain);
        scripted!(warnings, failure);
        Outcome::ok(default_domain(&mut s)).with_warnings(warnings)
    }

    async fn get_application_routes(&self, app: &AppGuid) -> Outcome<Vec<Route>> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::GetApplicationRoutes);
        scripted!(warnings, failure);
        let routes = s
            .mappings
            .iter()
            .filter(|(_, guid)| guid == app)
            .filter_map(|(route, _)| s.routes.iter().find(|r| &r.guid == route))
            .cloned()
            .collect();
        Outcome::ok(routes).with_warnings(warnings)
    }

    async fn get_route(&self, domain: &Domain, host: &str, path: &str) -> Outcome<Route> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::GetRoute);
        scripted!(warnings, failure);
        let found = s
            .routes
            .iter()
            .find(|r| r.domain.guid == domain.guid && r.host == host && r.path == path)
            .cloned();
        match found {
            Some(route) => Outcome::ok(route),
            None => {
                let wanted = Route {
                    host: host.to_string(),
                    domain: domain.clone(),
                    path: path.to_string(),
                    ..Route::default()
                };
                Outcome::err(ApiError::RouteNotFound(wanted.url()))
            }
        }
        .with_warnings(warnings)
    }

    async fn create_route(
        &self,
        _space: &SpaceGuid,
        domain: &Domain,
        host: &str,
        path: &str,
    ) -> Outcome<Route> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateRoute);
        scripted!(warnings, failure);
        let route = Route {
            guid: s.next_guid("route"),
            host: host.to_string(),
            domain: domain.clone(),
            path: path.to_string(),
        };
        s.routes.push(route.clone());
        Outcome::ok(route).with_warnings(warnings)
    }

    async fn map_route(&self, route: &RouteGuid, app: &AppGuid) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::MapRoute);
        scripted!(warnings, failure);
        let mapping = (route.clone(), app.clone());
        if !s.mappings.contains(&mapping) {
            s.mappings.push(mapping);
        }
        Outcome::ok(()).with_warnings(warnings)
    }
}

#[async_trait]
impl DeploymentOps for InMemoryPlatform {
    async fn create_deployment(&self, request: &DeploymentRequest) -> Outcome<DeploymentGuid> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::CreateDeployment);
        scripted!(warnings, failure);
        s.deployments.push(request.clone());
        s.current_droplets
            .insert(request.app.clone(), request.droplet.clone());
        if let Some(app) = s.app_by_guid_mut(&request.app) {
            app.state = ApplicationState::Started;
        }
        Outcome::ok(s.next_guid("deployment")).with_warnings(warnings)
    }

    async fn poll_deployment(
        &self,
        _app: &Application,
        _deployment: &DeploymentGuid,
        _no_wait: bool,
        details: InstanceDetailsSender,
    ) -> Outcome<()> {
        let (failure, warnings) = self.state.lock().enter(Operation::PollDeployment);
        self.report_details(&details);
        self.settle(Operation::PollDeployment).await;
        scripted!(warnings, failure);
        Outcome::ok(()).with_warnings(warnings)
    }
}

/// The part of an applied manifest the fake acts on.
#[derive(serde::Deserialize)]
struct AppliedManifest {
    #[serde(default)]
    applications: Vec<AppliedApplication>,
}

#[derive(serde::Deserialize)]
struct AppliedApplication {
    name: String,
}

#[async_trait]
impl SpaceOps for InMemoryPlatform {
    async fn set_space_manifest(&self, space: &SpaceGuid, manifest: &[u8]) -> Outcome<()> {
        let mut s = self.state.lock();
        let (failure, warnings) = s.enter(Operation::SetSpaceManifest);
        scripted!(warnings, failure);

        let applied: AppliedManifest = match serde_yaml::from_slice(manifest) {
            Ok(applied) => applied,
            Err(e) => {
                return Outcome::err(ApiError::Remote(format!("invalid manifest: {e}")))
                    .with_warnings(warnings);
            }
        };
        s.space_manifests.push((space.clone(), manifest.to_vec()));

        for app in applied.applications {
            if s.apps.contains_key(&app.name) {
                continue;
            }
            let name = match AppName::new(&app.name) {
                Ok(name) => name,
                Err(e) => {
                    return Outcome::err(ApiError::Remote(format!("{}: {e}", app.name)))
                        .with_warnings(warnings);
                }
            };
            let created = Application {
                guid: s.next_guid("app"),
                state: ApplicationState::Stopped,
                ..Application::named(name)
            };
            s.apps.insert(app.name, created);
        }
        Outcome::ok(()).with_warnings(warnings)
    }
}
