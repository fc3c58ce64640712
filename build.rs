#[cfg(windows)]
fn main() {
    println!("cargo:rerun-if-changed=shaders/overlay.hlsl");

    let mut res = winres::WindowsResource::new();
    res.set("ProductName", "Rect Overlay");
    res.set("FileDescription", "Rect Overlay - Direct3D 11 rectangle overlay");
    res.set("LegalCopyright", "© 2025 Rect Overlay Contributors");
    res.set("CompanyName", "Rect Overlay");
    res.set("OriginalFilename", "rect-overlay.exe");

    if let Err(e) = res.compile() {
        eprintln!("Failed to compile Windows resource: {}", e);
    }
}

#[cfg(not(windows))]
fn main() {
}
