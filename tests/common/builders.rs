use chisel_sdf::archive::PackageAvailability;
use chisel_sdf::chisel::Slice;
use chisel_sdf::orchestration::InstallTask;
use std::path::Path;

pub fn slice(name: &str, package: &str, essential: &[&str]) -> Slice {
    Slice::new(name, package).with_essential(essential.iter().copied())
}

pub fn names(slices: &[Slice]) -> Vec<&str> {
    slices.iter().map(|s| s.name.as_str()).collect()
}

pub fn availability(package: &str, arch: &str) -> PackageAvailability {
    PackageAvailability {
        package: package.to_string(),
        version: "1.0-1".to_string(),
        suite: "noble".to_string(),
        arch: arch.to_string(),
    }
}

/// Slices of `hello`, `python3`, `libc6` and `java`, in that input order.
pub fn mixed_availability_slices() -> Vec<Slice> {
    vec![
        slice("hello_bins", "hello", &[]),
        slice("hello_copyright", "hello", &[]),
        slice("python3_core", "python3", &[]),
        slice("libc6_libs", "libc6", &[]),
        slice("java_extra", "java", &[]),
    ]
}

/// Archive rows matching [`mixed_availability_slices`]; `python3` is absent.
pub fn mixed_availability_rows() -> Vec<PackageAvailability> {
    vec![
        availability("hello", "amd64, arm64, i386"),
        availability("libc6", "all"),
        availability("java", "arm64, i386"),
    ]
}

/// One single-slice task per name, with a `cut` argument prefix.
pub fn single_slice_tasks(slice_names: &[&str]) -> Vec<InstallTask> {
    slice_names
        .iter()
        .map(|name| {
            InstallTask::new(
                vec!["cut".to_string(), "--arch".to_string(), "amd64".to_string()],
                vec![name.to_string()],
            )
            .expect("task has a slice")
        })
        .collect()
}

pub const UBUNTU_CHISEL_YAML: &str = r#"
format: v1
archives:
  ubuntu:
    version: 24.04
    suites: [noble, noble-security, noble-updates]
    components: [main, universe]
"#;

/// Write a release directory with the given `chisel.yaml`.
pub fn write_release(dir: &Path, chisel_yaml: &str) {
    std::fs::write(dir.join("chisel.yaml"), chisel_yaml).expect("write chisel.yaml");
}
