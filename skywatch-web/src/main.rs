#[macroquad::main("Skywatch")]
async fn main() {
    skywatch_web_lib::run().await;
}
