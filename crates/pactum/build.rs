use std::process::Command;

fn main() {
    for (cargo_var, exported) in [
        ("TARGET", "PACTUM_BUILD_TARGET"),
        ("PROFILE", "PACTUM_BUILD_PROFILE"),
    ] {
        if let Ok(value) = std::env::var(cargo_var) {
            println!("cargo:rustc-env={exported}={value}");
        }
        println!("cargo:rerun-if-env-changed={cargo_var}");
    }

    // An explicit PACTUM_GIT_HASH wins over asking git.
    if let Some(hash) = std::env::var("PACTUM_GIT_HASH").ok().or_else(git_hash) {
        println!("cargo:rustc-env=PACTUM_GIT_HASH={hash}");
    }
    println!("cargo:rerun-if-env-changed=PACTUM_GIT_HASH");
}

/// Short commit hash of the checkout, when built from one.
fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
