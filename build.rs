use std::{env, path::PathBuf};

// ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except
// Windows, where a vcpkg install has to be pointed at by hand.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=stillframe needs FFmpeg: set FFMPEG_DIR, or VCPKG_ROOT for a vcpkg install");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.is_dir() {
        println!(
            "cargo:warning=Found FFmpeg under {}; set FFMPEG_DIR to it if linking fails",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist",
            candidate.display()
        );
    }
}
