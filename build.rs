// Build script for the embedded model weights
//
// The built-in model parameters are compiled into the binary with
// `include_str!`, so cargo has to rebuild when the weights file changes.

fn main() {
    println!("cargo:rerun-if-changed=assets/model_weights.json");
}
