use pinboard_board::Application;
use pinboard_engine::logging::{init_logging, LoggingConfig};

fn main() {
    init_logging(LoggingConfig::default());

    println!();
    println!("  pinboard");
    println!("  ────────────────────────────────────────");
    println!("  drop images      add to the board");
    println!("  click / drag     select / move");
    println!("  Up / Down        raise / lower selection");
    println!("  Delete           remove selection");
    println!("  Alt + drag       pan");
    println!("  S                save project_01.png");
    println!();

    if let Err(e) = Application::new().title("Pinboard").size(1024.0, 768.0).run() {
        log::error!("pinboard runtime error: {e:#}");
        std::process::exit(1);
    }
}
