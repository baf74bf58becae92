use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use stunotes::api::{ApiClient, Backend};
use stunotes::app::App;
use stunotes::auth::AuthSession;
use stunotes::config::Config;
use stunotes::logger;
use stunotes::storage::LocalStore;
use stunotes::theme::ThemeContext;
use stunotes::ui;
use stunotes::worker::{spawn_api_worker, ApiRequest, ApiResponse};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const TICK_RATE: Duration = Duration::from_millis(250);

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!("Failed to create {}: {}", config.data_dir.display(), e);
    }
    logger::init(&config.log_path());
    logger::log(&format!("Starting StuNotes against {}", config.backend_url));

    let backend: Arc<dyn Backend> = match ApiClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let store = LocalStore::open(&config.storage_path());
    let auth = AuthSession::new(backend.clone(), store.clone());

    let (request_tx, request_rx) = mpsc::unbounded_channel::<ApiRequest>();
    let (response_tx, response_rx) = mpsc::unbounded_channel::<ApiResponse>();
    let worker = spawn_api_worker(backend, auth, request_rx, response_tx);

    let mut app = App::new(&config, ThemeContext::load(store));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut app, &request_tx, response_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    drop(request_tx);
    worker.abort();
    logger::log("StuNotes exited");
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    requests: &UnboundedSender<ApiRequest>,
    mut responses: UnboundedReceiver<ApiResponse>,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        for request in app.take_requests() {
            if requests.send(request).is_err() {
                logger::error("API worker stopped, request dropped");
            }
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
            Some(response) = responses.recv() => app.handle_response(response),
            _ = ticker.tick() => app.tick(),
        }
    }
}
