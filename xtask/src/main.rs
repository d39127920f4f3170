//! Bundles the Sunbox plug-in: `cargo run -p xtask -- bundle sunbox-plugin --release`.
//!
//! Copy the SunVox engine library next to the bundled binary afterwards; the
//! plug-in looks for it there.

fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
