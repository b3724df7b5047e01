mod common;

use chisel_sdf::chisel::{parse_slices, ChiselError, ReleaseConfig};
use chisel_sdf::orchestration::{InstallPlan, PlanOptions};
use common::*;

const HELLO_YAML: &str = r#"
package: hello
essential:
  - hello_copyright
slices:
  bins:
    essential:
      - libc6_libs
    contents:
      /usr/bin/hello:
  copyright:
    contents:
      /usr/share/doc/hello/copyright:
"#;

#[test]
fn test_parse_definition_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.yaml");
    std::fs::write(&path, HELLO_YAML).unwrap();

    let slices = parse_slices(&path).unwrap();
    assert_eq!(names(&slices), vec!["hello_bins", "hello_copyright"]);
    assert_eq!(slices[0].essential, vec!["libc6_libs", "hello_copyright"]);
    assert!(slices.iter().all(|s| s.package == "hello"));
}

#[test]
fn test_package_essential_makes_self_reference_prunable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.yaml");
    std::fs::write(&path, HELLO_YAML).unwrap();

    let plan = InstallPlan::build(
        parse_slices(&path).unwrap(),
        &PlanOptions {
            prune: true,
            combine: false,
        },
    );
    // `hello_copyright` lists itself through the package essentials, so
    // nothing remains top-level except `hello_bins`.
    assert_eq!(plan.groups(), &[vec!["hello_bins".to_string()]]);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = parse_slices(&path).unwrap_err();
    assert!(matches!(err, ChiselError::Read { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "package: [unterminated\n").unwrap();

    assert!(matches!(
        parse_slices(&path).unwrap_err(),
        ChiselError::Yaml { .. }
    ));
}

#[test]
fn test_release_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_release(dir.path(), UBUNTU_CHISEL_YAML);
    let path = dir.path().join("chisel.yaml");

    let release = ReleaseConfig::from_file(&path).unwrap();
    let ubuntu = release.archive(&path, "ubuntu").unwrap();
    assert_eq!(ubuntu.components, vec!["main", "universe"]);
    assert!(release.archive(&path, "debian").is_err());
}
