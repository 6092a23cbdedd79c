// Bundles the plugin: `cargo xtask bundle trifold --release`

fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
