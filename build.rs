fn main() {
    // Host builds (unit tests, fuzzing) have no ESP-IDF toolchain to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
