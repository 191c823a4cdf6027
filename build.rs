fn main() {
    #[cfg(feature = "firmware")]
    firmware();
}

#[cfg(feature = "firmware")]
fn firmware() {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    // put memory.x where the linker finds it
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::copy("memory.x", out.join("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    let mut b = freertos_cargo_build::Builder::new();
    // path to the FreeRTOS kernel sources, override with FREERTOS_SRC
    b.freertos(env::var("FREERTOS_SRC").unwrap_or_else(|_| String::from("FreeRTOS-Kernel")));
    b.freertos_config("src/freertos");
    b.freertos_port(String::from("GCC/ARM_CM4F"));
    b.heap(String::from("heap_4.c"));
    b.compile().unwrap_or_else(|e| panic!("{}", e));
    println!("cargo:rerun-if-changed=src/freertos/FreeRTOSConfig.h");
}
