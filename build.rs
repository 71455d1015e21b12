use std::process::Command;
fn main() {
    // Source tarballs have no git metadata, fall back to "unknown" there.
    let git_describe = Command::new("git")
        .args(&["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|describe| describe.trim().to_string())
        .filter(|describe| !describe.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_DESCRIBE={}", git_describe);
}
