//! Pre-build and post-build hooks

use appcfg_fs::{NormalizedPath, ProjectLayout};
use appcfg_index::desktop::write_desktop_config;
use appcfg_index::values::write_values_resource;
use appcfg_index::{ConfigFileIndex, ConfigFileType, ConfigIndex, ConfigResolver, Resolution, ResolveMode};
use appcfg_patch::{
    FileSettingsStore, ManifestTarget, NativeProjectTarget, PatchRegistry, RunReport, SettingsStore,
};

use crate::disambiguator::{InteractiveDisambiguator, PromptStatus, Prompter};
use crate::error::{Error, Result};
use crate::features::{builtin_manifest_registry, builtin_native_registry};
use crate::identity::{ApplicationIdentity, BuildTarget};
use crate::notifier::{AssetChangeHandle, AssetChangeNotifier};

/// Outcome of [`BuildHooks::pre_build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreBuildReport {
    pub target: BuildTarget,
    /// Identifier after any interactive change
    pub identifier: Option<String>,
    pub prompt: PromptStatus,
    pub resolution: Resolution,
    pub desktop_config: Option<NormalizedPath>,
}

/// An artifact whose patch was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFailure {
    pub artifact: NormalizedPath,
    pub message: String,
}

/// Outcome of a post-build hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostBuildReport {
    pub patches: RunReport,
    pub written: Vec<NormalizedPath>,
    pub failures: Vec<ArtifactFailure>,
    /// Project-relative resources the host should add to the native project
    pub file_references: Vec<String>,
}

impl PostBuildReport {
    pub fn is_success(&self) -> bool {
        self.patches.is_success() && self.failures.is_empty()
    }

    fn fail(&mut self, artifact: &NormalizedPath, error: impl std::fmt::Display) {
        tracing::error!(artifact = %artifact, error = %error, "Artifact patch aborted");
        self.failures.push(ArtifactFailure {
            artifact: artifact.clone(),
            message: error.to_string(),
        });
    }
}

/// Build-pipeline context for one host project.
pub struct BuildHooks {
    layout: ProjectLayout,
    scanner: ConfigFileIndex,
    index: ConfigIndex,
    index_stale: bool,
    /// One prompt state and guard per target
    disambiguators: [InteractiveDisambiguator; BuildTarget::ALL.len()],
    notifier: AssetChangeNotifier,
    manifest_patches: PatchRegistry<ManifestTarget>,
    native_patches: PatchRegistry<NativeProjectTarget>,
}

impl BuildHooks {
    /// Hooks for the project at `root` with the built-in features.
    pub fn open(root: impl Into<NormalizedPath>) -> Result<Self> {
        let layout = ProjectLayout::load(root)?;
        Self::new(layout)
    }

    pub fn new(layout: ProjectLayout) -> Result<Self> {
        Ok(Self::with_parts(
            ConfigFileIndex::new(layout),
            builtin_manifest_registry()?,
            builtin_native_registry()?,
        ))
    }

    /// Hooks with a custom scanner and registries.
    pub fn with_parts(
        scanner: ConfigFileIndex,
        manifest_patches: PatchRegistry<ManifestTarget>,
        native_patches: PatchRegistry<NativeProjectTarget>,
    ) -> Self {
        let layout = scanner.layout().clone();
        Self {
            notifier: AssetChangeNotifier::new(&layout),
            layout,
            scanner,
            index: ConfigIndex::default(),
            index_stale: true,
            disambiguators: std::array::from_fn(|_| InteractiveDisambiguator::new()),
            manifest_patches,
            native_patches,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Index as of the last refresh.
    pub fn index(&self) -> &ConfigIndex {
        &self.index
    }

    pub fn disambiguator(&self, target: BuildTarget) -> &InteractiveDisambiguator {
        &self.disambiguators[target.index()]
    }

    pub fn disambiguator_mut(&mut self, target: BuildTarget) -> &mut InteractiveDisambiguator {
        &mut self.disambiguators[target.index()]
    }

    /// Per-feature settings persisted at the layout's settings path.
    pub fn open_settings(&self) -> Result<FileSettingsStore> {
        let path = self.layout.settings_path();
        tracing::debug!(path = %path, "Opening feature settings");
        Ok(FileSettingsStore::open(path)?)
    }

    /// Handle for a file watcher to report asset changes.
    pub fn asset_changes(&self) -> AssetChangeHandle {
        self.notifier.handle()
    }

    pub fn manifest_patches_mut(&mut self) -> &mut PatchRegistry<ManifestTarget> {
        &mut self.manifest_patches
    }

    pub fn native_patches_mut(&mut self) -> &mut PatchRegistry<NativeProjectTarget> {
        &mut self.native_patches
    }

    /// Main-thread tick: rebuild the index if assets changed.
    ///
    /// Returns whether a rebuild happened.
    pub fn on_tick(&mut self) -> bool {
        if self.notifier.take_pending() {
            self.index_stale = true;
        }
        if !self.index_stale {
            return false;
        }

        self.index = self.scanner.rebuild();
        self.index_stale = false;
        for disambiguator in &mut self.disambiguators {
            disambiguator.reset_guard();
        }
        tracing::debug!(files = self.index.len(), "Config index rebuilt");
        true
    }

    /// Resolve the config for `target`, prompting on an identifier mismatch.
    pub fn pre_build(
        &mut self,
        target: BuildTarget,
        identity: &mut dyn ApplicationIdentity,
        prompter: &mut dyn Prompter,
    ) -> Result<PreBuildReport> {
        self.on_tick();

        let file_type = target.config_type();
        let current = identity.identifier(target);
        let candidates = self.index.identifiers(file_type);
        let prompt = self.disambiguators[target.index()].maybe_prompt(
            candidates,
            current.as_deref(),
            prompter,
            |picked| identity.set_identifier(target, picked),
        )?;

        let identifier = identity.identifier(target);
        let wanted = identifier.as_deref().unwrap_or_default();
        let resolution =
            ConfigResolver::new(&self.index).resolve(file_type, wanted, ResolveMode::MatchOnly);
        if resolution.is_not_found() {
            tracing::warn!(%target, identifier = wanted, "No config file serves the application identifier");
        }

        let desktop_config = match target {
            BuildTarget::Desktop => write_desktop_config(&self.index, &self.layout, wanted)?,
            BuildTarget::Android | BuildTarget::Ios => None,
        };

        Ok(PreBuildReport {
            target,
            identifier,
            prompt,
            resolution,
            desktop_config,
        })
    }

    /// Patch the Android manifest and regenerate the values resource.
    ///
    /// Fails before touching anything when features are registered but no
    /// config serves the package.
    pub fn post_build_android(
        &mut self,
        identity: &dyn ApplicationIdentity,
        settings: &dyn SettingsStore,
    ) -> Result<PostBuildReport> {
        self.on_tick();

        let package = identity
            .identifier(BuildTarget::Android)
            .ok_or(Error::MissingIdentifier {
                target: BuildTarget::Android,
            })?;
        self.require_config(ConfigFileType::StructuredText, &package, !self.manifest_patches.is_empty())?;

        let mut report = PostBuildReport::default();
        let manifest_path = self.layout.manifest_path();
        let mut manifest = ManifestTarget::open(manifest_path.clone(), &package);
        report.patches = self.manifest_patches.run_all(&mut manifest, settings);
        match manifest.save() {
            Ok(true) => report.written.push(manifest_path),
            Ok(false) => {}
            Err(e) => report.fail(&manifest_path, e),
        }

        match write_values_resource(&self.index, &self.layout, &package) {
            Ok(Some(path)) => report.written.push(path),
            Ok(None) => {}
            Err(e) => report.fail(&self.layout.values_resource_path(), e),
        }

        Ok(report)
    }

    /// Copy the config into a generated native project and patch it.
    ///
    /// Fails before touching anything when features are registered but no
    /// config serves the bundle id.
    pub fn post_build_ios(
        &mut self,
        project_root: &NormalizedPath,
        identity: &dyn ApplicationIdentity,
        settings: &dyn SettingsStore,
    ) -> Result<PostBuildReport> {
        self.on_tick();

        let bundle_id = identity
            .identifier(BuildTarget::Ios)
            .ok_or(Error::MissingIdentifier {
                target: BuildTarget::Ios,
            })?;
        let config = self.require_config(
            ConfigFileType::PropertyList,
            &bundle_id,
            !self.native_patches.is_empty(),
        )?;

        let mut report = PostBuildReport::default();
        let mut project = NativeProjectTarget::open(&self.layout, project_root.clone())?;

        if let Some(source) = config {
            match project.copy_config_into_project(&source) {
                Ok(copied) => {
                    if let Err(e) = project.add_file_reference(&copied) {
                        report.fail(&copied, e);
                    }
                    report.written.push(copied);
                }
                Err(e) => report.fail(project_root, e),
            }
        }

        report.patches = self.native_patches.run_all(&mut project, settings);
        report.file_references = project.file_references().to_vec();
        match project.save() {
            Ok(written) => report.written.extend(written),
            Err(e) => report.fail(project_root, e),
        }

        Ok(report)
    }

    fn require_config(
        &self,
        file_type: ConfigFileType,
        identifier: &str,
        active: bool,
    ) -> Result<Option<NormalizedPath>> {
        let resolution =
            ConfigResolver::new(&self.index).resolve(file_type, identifier, ResolveMode::MatchOnly);
        let file = resolution.require(active, file_type, identifier)?;
        Ok(file.map(|f| f.path))
    }
}
