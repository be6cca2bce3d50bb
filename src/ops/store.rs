//! Local component store operations
//!
//! Store layout:
//! - modules: `<base>/modules/<platform>/<id>/<version>/`
//! - widgets: `<root>/<alloy_base>/widgets/<id>/` in a project,
//!   `<base>/widgets/<id>/` in the global store
//!
//! Component archives are gzipped tarballs whose entries are relative to
//! the store base, so installing one is a plain unpack. Anything that needs
//! a registry (resolving a bare id to a download, version-range matching,
//! update checks) is out of scope here and reported as such.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Serialize;

use super::{OpError, Ops};
use crate::cli::Output;
use crate::domain::{ComponentType, OutputMode, Request};
use crate::storage::Context;

const USER_AGENT: &str = concat!("compo/", env!("CARGO_PKG_VERSION"));

/// One installed component found in a store.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub id: String,
    pub kind: ComponentType,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub scope: &'static str,
    pub path: PathBuf,
}

/// The shipped [`Ops`] implementation, working against the local stores.
pub struct LocalStore<'a> {
    output: &'a Output,
}

impl<'a> LocalStore<'a> {
    pub fn new(output: &'a Output) -> Self {
        Self { output }
    }

    /// Scans one store scope for installed components.
    fn scan(&self, context: &Context, global: bool) -> Result<Vec<Component>, OpError> {
        let scope = if global { "global" } else { "project" };
        let mut components = Vec::new();

        if let Some(modules_dir) = context.modules_dir(global) {
            if modules_dir.is_dir() {
                for platform_entry in dirs_in(&modules_dir)? {
                    let platform = name_of(&platform_entry);
                    for id_entry in dirs_in(&platform_entry)? {
                        let id = name_of(&id_entry);
                        for version_entry in dirs_in(&id_entry)? {
                            components.push(Component {
                                id: id.clone(),
                                kind: ComponentType::Module,
                                version: Some(name_of(&version_entry)),
                                platform: Some(platform.clone()),
                                scope,
                                path: version_entry,
                            });
                        }
                    }
                }
            }
        }

        if let Some(widgets_dir) = context.widgets_dir(global) {
            if widgets_dir.is_dir() {
                for widget_entry in dirs_in(&widgets_dir)? {
                    components.push(Component {
                        id: name_of(&widget_entry),
                        kind: ComponentType::Widget,
                        version: widget_version(&widget_entry),
                        platform: None,
                        scope,
                        path: widget_entry,
                    });
                }
            }
        }

        Ok(components)
    }

    /// Components in the request's scope matching id and any version,
    /// platform and type filters carried by the request.
    fn matching(
        &self,
        context: &Context,
        request: &Request,
        id: &str,
    ) -> Result<Vec<Component>, OpError> {
        Ok(self
            .scan(context, request.global)?
            .into_iter()
            .filter(|c| c.id == id)
            .filter(|c| kind_matches(c, request.kind))
            .filter(|c| version_matches(c, request.version.as_deref()))
            .filter(|c| platform_matches(c, request.platform.as_deref()))
            .collect())
    }

    fn install_from_file(
        &self,
        context: &Context,
        request: &Request,
        archive: &Path,
    ) -> Result<(), OpError> {
        let dest = context.base_dir(request.global).ok_or(OpError::NoStore)?;
        let before = self.scan(context, request.global)?;

        self.output
            .verbose_ctx("install", &format!("unpacking {} into {}", archive.display(), dest.display()));

        let file = File::open(archive).map_err(|source| OpError::Unpack {
            path: archive.to_path_buf(),
            source,
        })?;
        unpack_into(GzDecoder::new(file), dest, archive)?;

        self.report_new(context, request, &before, &archive.display().to_string())
    }

    fn install_from_url(
        &self,
        context: &Context,
        request: &Request,
        url: &str,
    ) -> Result<(), OpError> {
        let dest = context.base_dir(request.global).ok_or(OpError::NoStore)?;
        let before = self.scan(context, request.global)?;

        self.output.verbose_ctx("fetch", url);
        let response = ureq::get(url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| OpError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        unpack_into(GzDecoder::new(response.into_reader()), dest, Path::new(url))?;

        self.report_new(context, request, &before, url)
    }

    fn install_by_id(
        &self,
        context: &Context,
        request: &Request,
        id: &str,
    ) -> Result<(), OpError> {
        let installed = self.matching(context, request, id)?;

        if !installed.is_empty() && !request.force {
            for component in &installed {
                self.output
                    .success(&format!("{} already installed", describe(component)));
            }
            return Ok(());
        }

        // Present-but-forced and absent both need a source we don't have.
        Err(OpError::NoSource(id.to_string()))
    }

    /// Reports on the whole store for bare `install` and `update` runs.
    fn report_store(&self, context: &Context, request: &Request) -> Result<(), OpError> {
        let components: Vec<Component> = self
            .scan(context, request.global)?
            .into_iter()
            .filter(|c| kind_matches(c, request.kind))
            .filter(|c| platform_matches(c, request.platform.as_deref()))
            .collect();

        if components.is_empty() {
            self.output.success("no components installed");
            return Ok(());
        }

        let label = if request.update {
            "up to date"
        } else {
            "already installed"
        };
        for component in &components {
            self.output
                .success(&format!("{} {}", describe(component), label));
        }

        Ok(())
    }

    /// Reports components that appeared in the store since `before`.
    fn report_new(
        &self,
        context: &Context,
        request: &Request,
        before: &[Component],
        source: &str,
    ) -> Result<(), OpError> {
        let known: HashSet<&PathBuf> = before.iter().map(|c| &c.path).collect();
        let after = self.scan(context, request.global)?;

        let fresh: Vec<&Component> = after.iter().filter(|c| !known.contains(&c.path)).collect();
        if fresh.is_empty() {
            self.output
                .success(&format!("unpacked {} but found no new components", source));
        } else {
            for component in fresh {
                self.output
                    .success(&format!("installed {}", describe(component)));
            }
        }

        Ok(())
    }
}

impl Ops for LocalStore<'_> {
    fn install(&self, context: &Context, request: &Request) -> Result<(), OpError> {
        if let Some(url) = &request.url {
            return self.install_from_url(context, request, url);
        }
        if let Some(file) = &request.file {
            return self.install_from_file(context, request, file);
        }
        if !request.update {
            if let Some(id) = request.id.as_deref() {
                return self.install_by_id(context, request, id);
            }
        }

        self.report_store(context, request)
    }

    fn uninstall(&self, context: &Context, request: &Request) -> Result<(), OpError> {
        let id = request.id.as_deref().ok_or(OpError::MissingId)?;

        let matches = self.matching(context, request, id)?;
        if matches.is_empty() {
            return Err(OpError::NotInstalled(id.to_string()));
        }

        for component in matches {
            fs::remove_dir_all(&component.path)?;

            // Drop the now-empty id and platform directories modules leave behind.
            if component.kind == ComponentType::Module {
                if let Some(id_dir) = component.path.parent() {
                    let _ = fs::remove_dir(id_dir);
                    if let Some(platform_dir) = id_dir.parent() {
                        let _ = fs::remove_dir(platform_dir);
                    }
                }
            }

            self.output
                .success(&format!("uninstalled {}", describe(&component)));
        }

        Ok(())
    }

    fn demo(&self, context: &Context, request: &Request) -> Result<(), OpError> {
        let id = request.id.as_deref().ok_or(OpError::MissingId)?;

        let mut modules: Vec<Component> = self
            .matching(context, request, id)?
            .into_iter()
            .filter(|c| c.kind == ComponentType::Module)
            .collect();
        // Versions compare lexically here; range-aware ordering needs
        // registry metadata.
        modules.sort_by(|a, b| a.version.cmp(&b.version));

        let Some(component) = modules.pop() else {
            return Err(OpError::NotInstalled(id.to_string()));
        };

        let example = component.path.join("example");
        if !example.is_dir() {
            return Err(OpError::NoExample(id.to_string()));
        }

        let dest = std::env::current_dir()?.join(format!("{}-demo", id));
        if dest.exists() {
            if !request.force {
                return Err(OpError::DemoExists(dest));
            }
            fs::remove_dir_all(&dest)?;
        }

        copy_dir(&example, &dest)?;
        self.output.success(&format!(
            "created demo project for {} at {}",
            describe(&component),
            dest.display()
        ));

        Ok(())
    }

    fn info(&self, request: &Request) -> Result<(), OpError> {
        let id = request.id.as_deref().ok_or(OpError::MissingId)?;
        let context = Context::discover()?;

        let mut found = Vec::new();
        if context.project_root.is_some() {
            found.extend(self.scan(&context, false)?.into_iter().filter(|c| c.id == id));
        }
        found.extend(self.scan(&context, true)?.into_iter().filter(|c| c.id == id));

        if found.is_empty() {
            return Err(OpError::NotInstalled(id.to_string()));
        }

        match request.output.unwrap_or_default() {
            OutputMode::Json => self.output.data(&found),
            OutputMode::Pretty => {
                for component in &found {
                    println!("{} {}", component.kind.as_str(), component.id);
                    if let Some(version) = &component.version {
                        println!("  version:  {}", version);
                    }
                    if let Some(platform) = &component.platform {
                        println!("  platform: {}", platform);
                    }
                    println!("  scope:    {}", component.scope);
                    println!("  path:     {}", component.path.display());
                }
            }
        }

        Ok(())
    }
}

fn describe(component: &Component) -> String {
    let mut description = format!("{} {}", component.kind.as_str(), component.id);
    if let Some(version) = &component.version {
        description.push('@');
        description.push_str(version);
    }
    if let Some(platform) = &component.platform {
        description.push_str(&format!(" ({})", platform));
    }
    description
}

fn kind_matches(component: &Component, kind: Option<ComponentType>) -> bool {
    kind.map_or(true, |k| component.kind == k)
}

fn version_matches(component: &Component, version: Option<&str>) -> bool {
    version.map_or(true, |v| component.version.as_deref() == Some(v))
}

/// Widgets are platform-neutral and match any platform filter. The filter
/// may be a comma-separated list.
fn platform_matches(component: &Component, filter: Option<&str>) -> bool {
    match (filter, &component.platform) {
        (None, _) => true,
        (Some(_), None) => true,
        (Some(filter), Some(platform)) => filter.split(',').any(|p| p.trim() == platform),
    }
}

/// Subdirectories of `dir`, sorted for stable output.
fn dirs_in(dir: &Path) -> Result<Vec<PathBuf>, OpError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn widget_version(path: &Path) -> Option<String> {
    let manifest = fs::read_to_string(path.join("widget.json")).ok()?;
    let manifest: serde_json::Value = serde_json::from_str(&manifest).ok()?;
    manifest.get("version")?.as_str().map(String::from)
}

fn unpack_into<R: std::io::Read>(reader: R, dest: &Path, source: &Path) -> Result<(), OpError> {
    fs::create_dir_all(dest)?;
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|io| OpError::Unpack {
            path: source.to_path_buf(),
            source: io,
        })
}

fn copy_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GlobalConfig;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn fake_context(dir: &TempDir) -> Context {
        let context = Context {
            config: GlobalConfig::default(),
            project_root: Some(dir.path().join("project")),
            alloy_base: "app".to_string(),
            global_base: dir.path().join("global"),
        };
        fs::create_dir_all(context.project_root.as_deref().unwrap()).unwrap();
        fs::create_dir_all(&context.global_base).unwrap();
        context
    }

    fn add_module(base: &Path, platform: &str, id: &str, version: &str) -> PathBuf {
        let dir = base.join("modules").join(platform).join(id).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("manifest"), format!("id: {}\n", id)).unwrap();
        dir
    }

    fn add_widget(base: &Path, alloy_base: Option<&str>, id: &str, version: &str) -> PathBuf {
        let widgets = match alloy_base {
            Some(alloy_base) => base.join(alloy_base).join("widgets"),
            None => base.join("widgets"),
        };
        let dir = widgets.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("widget.json"),
            format!(r#"{{"id": "{}", "version": "{}"}}"#, id, version),
        )
        .unwrap();
        dir
    }

    fn request(id: &str) -> Request {
        Request {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn scan_finds_modules_and_widgets() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        add_module(&root, "android", "ti.paint", "1.0.0");
        add_widget(&root, Some("app"), "com.widget.list", "2.1.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let mut components = store.scan(&cx, false).unwrap();
        components.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].id, "com.widget.list");
        assert_eq!(components[0].kind, ComponentType::Widget);
        assert_eq!(components[0].version.as_deref(), Some("2.1.0"));
        assert_eq!(components[0].platform, None);
        assert_eq!(components[1].id, "ti.paint");
        assert_eq!(components[1].kind, ComponentType::Module);
        assert_eq!(components[1].version.as_deref(), Some("1.0.0"));
        assert_eq!(components[1].platform.as_deref(), Some("android"));
    }

    #[test]
    fn scan_global_scope_is_separate() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        add_module(&cx.global_base, "ios", "ti.map", "3.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);

        assert!(store.scan(&cx, false).unwrap().is_empty());
        let global = store.scan(&cx, true).unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].scope, "global");
    }

    #[test]
    fn platform_filter_accepts_comma_separated_lists() {
        let component = Component {
            id: "foo".to_string(),
            kind: ComponentType::Module,
            version: Some("1.0.0".to_string()),
            platform: Some("android".to_string()),
            scope: "project",
            path: PathBuf::from("/tmp/foo"),
        };

        assert!(platform_matches(&component, None));
        assert!(platform_matches(&component, Some("android")));
        assert!(platform_matches(&component, Some("ios, android")));
        assert!(!platform_matches(&component, Some("ios")));
    }

    #[test]
    fn uninstall_removes_only_the_matching_version() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        let old = add_module(&root, "android", "ti.paint", "1.0.0");
        let new = add_module(&root, "android", "ti.paint", "2.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let mut req = request("ti.paint");
        req.version = Some("1.0.0".to_string());

        store.uninstall(&cx, &req).unwrap();

        assert!(!old.exists());
        assert!(new.exists());
    }

    #[test]
    fn uninstall_prunes_empty_module_directories() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        add_module(&root, "android", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        store.uninstall(&cx, &request("ti.paint")).unwrap();

        assert!(!root.join("modules").join("android").exists());
    }

    #[test]
    fn uninstall_missing_component_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let err = store.uninstall(&cx, &request("ti.gone")).unwrap_err();

        assert!(matches!(err, OpError::NotInstalled(id) if id == "ti.gone"));
    }

    #[test]
    fn uninstall_respects_platform_filter() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        let android = add_module(&root, "android", "ti.paint", "1.0.0");
        let ios = add_module(&root, "ios", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let mut req = request("ti.paint");
        req.platform = Some("ios".to_string());

        store.uninstall(&cx, &req).unwrap();

        assert!(android.exists());
        assert!(!ios.exists());
    }

    #[test]
    fn install_from_archive_unpacks_into_the_store() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();

        // Build a component archive with store-relative entries.
        let archive_path = dir.path().join("ti.paint.tgz");
        let encoder = GzEncoder::new(File::create(&archive_path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let content = b"module binary";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                "modules/android/ti.paint/1.0.0/module.zip",
                content.as_slice(),
            )
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let req = Request {
            file: Some(archive_path),
            ..Default::default()
        };

        store.install(&cx, &req).unwrap();

        assert!(root
            .join("modules/android/ti.paint/1.0.0/module.zip")
            .is_file());
    }

    #[test]
    fn install_by_id_reports_existing_install() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        add_module(&root, "android", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);

        assert!(store.install(&cx, &request("ti.paint")).is_ok());
    }

    #[test]
    fn install_by_id_without_a_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let err = store.install(&cx, &request("ti.unknown")).unwrap_err();

        assert!(matches!(err, OpError::NoSource(id) if id == "ti.unknown"));
    }

    #[test]
    fn forced_reinstall_still_needs_a_source() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        let root = cx.project_root.clone().unwrap();
        add_module(&root, "android", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let mut req = request("ti.paint");
        req.force = true;

        let err = store.install(&cx, &req).unwrap_err();
        assert!(matches!(err, OpError::NoSource(_)));
    }

    #[test]
    fn update_run_reports_the_store() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        add_module(&cx.global_base, "android", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let req = Request {
            update: true,
            global: true,
            ..Default::default()
        };

        assert!(store.install(&cx, &req).is_ok());
    }

    #[test]
    fn demo_without_example_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);
        add_module(&cx.global_base, "android", "ti.paint", "1.0.0");

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let req = Request {
            id: Some("ti.paint".to_string()),
            global: true,
            ..Default::default()
        };

        let err = store.demo(&cx, &req).unwrap_err();
        assert!(matches!(err, OpError::NoExample(id) if id == "ti.paint"));
    }

    #[test]
    fn demo_for_missing_module_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cx = fake_context(&dir);

        let output = Output::new(false);
        let store = LocalStore::new(&output);
        let req = Request {
            id: Some("ti.gone".to_string()),
            global: true,
            ..Default::default()
        };

        let err = store.demo(&cx, &req).unwrap_err();
        assert!(matches!(err, OpError::NotInstalled(_)));
    }
}
