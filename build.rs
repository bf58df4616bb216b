fn main() {
    // Emits the ESP-IDF sysenv cached by esp-idf-sys when building for the
    // target; on host builds this finds nothing and emits nothing.
    embuild::espidf::sysenv::output();
}
