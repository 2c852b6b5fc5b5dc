fn main() -> anyhow::Result<()> {
    planet_flow::run(planet_flow::SceneConfig::default())
}
