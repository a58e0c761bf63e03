fn main() {
    // Emits the ESP-IDF link arguments when building for the chip.
    // On host builds the sysenv cache is absent and this is a no-op.
    embuild::espidf::sysenv::output();
}
