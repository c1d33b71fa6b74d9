use macroquad::prelude::*;
use macroquad_tile_engine::TileEngine;
use tracing_subscriber::FmtSubscriber;

const SCROLL_SPEED: f32 = 240.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to install logger");

    let mut map = TileEngine::load("assets/map.json")
        .await
        .expect("Failed to load map");

    loop {
        clear_background(BLACK);

        let step = SCROLL_SPEED * get_frame_time();
        if is_key_down(KeyCode::Right) {
            map.set_sx(map.sx() + step);
        }
        if is_key_down(KeyCode::Left) {
            map.set_sx(map.sx() - step);
        }
        if is_key_down(KeyCode::Down) {
            map.set_sy(map.sy() + step);
        }
        if is_key_down(KeyCode::Up) {
            map.set_sy(map.sy() - step);
        }

        map.render();

        // Draw the frame rate in the top-left corner
        draw_text(&format!("FPS: {}", get_fps()), 20.0, 40.0, 30.0, RED);

        next_frame().await;
    }
}
