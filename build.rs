fn main() {
    println!("cargo:rerun-if-env-changed=DOORLOCK_CONFIG");
    println!("cargo:rerun-if-env-changed=DOORLOCK_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=DOORLOCK_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=DOORLOCK_HOSTNAME");

    // ESP-IDF link arguments are only meaningful for the device build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
