//! Running from a relative root such as the CLI default `.`.
//!
//! Changes the process working directory, so this file holds a single test
//! and runs as its own test binary.

use gccforge_core::fakes::ScriptedRunner;
use gccforge_core::{
    BuildConfiguration, BuildOptions, BuildRunner, ForgeConfig, ForgePipeline, Layout,
    ProcessRunner, ReleaseVersion,
};
use std::path::Path;

fn write_configure_script(source_dir: &Path) {
    std::fs::create_dir_all(source_dir).unwrap();
    let script = source_dir.join("configure");
    std::fs::write(&script, "#!/bin/sh\nprintf '%s\\n' \"$@\" > configure.args\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[tokio::test]
async fn test_dot_root_configures_with_absolute_paths() {
    let root = tempfile::tempdir().unwrap();
    std::env::set_current_dir(root.path()).unwrap();
    let cwd = std::env::current_dir().unwrap();

    let layout = Layout::new(".").unwrap();
    assert_eq!(layout.root(), cwd.as_path());

    // Real configure script spawned from the build directory.
    write_configure_script(&layout.source_dir());
    let options = BuildOptions {
        triple: "x86_64-linux-gnu".to_string(),
        jobs: 2,
        ..BuildOptions::default()
    };
    let configuration = BuildConfiguration::new(ReleaseVersion::new(13, 2, 0), &layout, &options);
    let runner = ProcessRunner;
    let builder = BuildRunner::new(&runner, layout.source_dir(), layout.build_dir(), 2, false);
    builder.prepare_build_dir().await.unwrap();
    builder.configure(&configuration).await.expect("configure should start");

    let args = std::fs::read_to_string(layout.build_dir().join("configure.args")).unwrap();
    let prefix = args
        .lines()
        .find_map(|l| l.strip_prefix("--prefix="))
        .expect("prefix passed");
    assert!(Path::new(prefix).is_absolute(), "prefix {prefix} must be absolute");
    assert_eq!(Path::new(prefix), cwd.join("gcc-13.2.0"));

    // Whole pipeline: every command gets absolute paths.
    std::fs::create_dir_all(cwd.join("gcc/.git")).unwrap();
    let scripted = ScriptedRunner::new();
    let mut config = ForgeConfig::new(Layout::new(".").unwrap());
    config.requested_version = Some("13.2.0".to_string());
    config.options = options;

    let report = ForgePipeline::new(&scripted).run(&config).await.unwrap();

    for call in scripted.calls() {
        assert!(call.cwd.is_absolute(), "{call} runs in a relative directory");
    }
    let configure = scripted
        .calls()
        .into_iter()
        .find(|c| c.program.ends_with("configure"))
        .expect("configure was run");
    assert!(Path::new(&configure.program).is_absolute());
    assert!(report.configuration.as_ref().unwrap().prefix.is_absolute());
    assert!(report.usage_instructions().unwrap().contains(&cwd.join("gcc-13.2.0/bin").display().to_string()));
}
