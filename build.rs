fn main() {
    // Host builds (tests, simulation) do not link against ESP-IDF.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
