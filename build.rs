//! Build script reporting the native libraries the detector links against.
//!
//! OpenCV is located through pkg-config; ONNX Runtime is downloaded by the
//! `ort` crate unless `ORT_LIB_LOCATION` points at a system install.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=ORT_LIB_LOCATION");

    report_opencv();
    report_onnx_runtime();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

/// Version reported by pkg-config for `package`, if installed
fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}

fn report_opencv() {
    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. The highgui, imgproc and videoio modules are required.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev pkg-config");
            println!("cargo:warning=On macOS: brew install opencv pkg-config");
        }
    }
}

fn report_onnx_runtime() {
    match env::var("ORT_LIB_LOCATION") {
        Ok(location) => println!("cargo:warning=Using ONNX Runtime from {location}"),
        Err(_) => println!("cargo:warning=ONNX Runtime binaries will be downloaded by the ort crate"),
    }
}
