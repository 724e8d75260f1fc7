//! Rig TestKit - terminal front end
//!
//! Feeds terminal mouse and keyboard events to the measurement tools and
//! renders their results.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode as TermKey, KeyEvent,
        KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseButton as TermButton,
        MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::fs::OpenOptions;
use std::io::stdout;
use std::time::{Duration, Instant};

use rig_testkit::{
    config::{self, Config},
    input::{KeyCode, KeyDisposition, MouseButton, RawInput},
    tools::TargetArea,
    ui::{
        App, AppState, AppView, Command, HelpPanel, KeyboardVisual, ResultsPanel, SeriesChart,
        StatusBar, TabBar, TargetPanel, ThemeColors, TypingPanel,
    },
};

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    init_logging(&config);
    log::info!("rig-testkit {} starting", env!("CARGO_PKG_VERSION"));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let key_releases = supports_keyboard_enhancement().unwrap_or(false);
    if key_releases {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Instant::now());
    if !key_releases {
        app.set_status("Terminal does not report key releases; use F7 to clear held keys");
    }

    let result = run(&mut terminal, &mut app);

    // Cleanup terminal
    if key_releases {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result?;

    let now = Instant::now();
    println!("\nRig TestKit session complete.");
    println!("Total events processed: {}", app.total_events);
    println!("Session duration: {}", app.elapsed_formatted(now));

    Ok(())
}

/// Log to a file in the config directory; the terminal belongs to the UI
fn init_logging(config: &Config) {
    let Ok(dir) = config::config_dir() else {
        return;
    };
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("rig-testkit.log"))
    else {
        return;
    };

    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = app.config.refresh_interval();
    let colors = ThemeColors::from_theme(app.config.ui.theme);

    loop {
        app.tick(Instant::now());
        let size = terminal.size()?;
        let side = Panes::split(Rect::new(0, 0, size.width, size.height)).side;
        app.set_target_area(TargetArea::new(
            i32::from(side.x) + 1,
            i32::from(side.y) + 1,
            i32::from(side.width.saturating_sub(2)),
            i32::from(side.height.saturating_sub(2)),
        ));
        terminal.draw(|frame| draw(frame, app, colors))?;

        // Wait for the first event, then drain everything already queued
        let mut timeout = tick_rate;
        while event::poll(timeout)? {
            let ev = event::read()?;
            handle_event(app, ev, Instant::now());
            timeout = Duration::ZERO;
        }

        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

fn handle_event(app: &mut App, ev: Event, now: Instant) {
    match ev {
        Event::Mouse(mouse) => {
            if let Some(input) = translate_mouse(mouse) {
                app.handle_input(input, now);
            }
        }
        Event::Key(key) => handle_key(app, key, now),
        Event::FocusLost => log::debug!("terminal focus lost"),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.code == TermKey::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }
    if let Some(command) = Command::from_key(key.code) {
        if key.kind == KeyEventKind::Press {
            app.execute(command, now);
        }
        return;
    }

    let Some(input) = translate_key(key) else {
        return;
    };
    let disposition = app.handle_input(input, now);

    if let TermKey::Char(ch) = key.code {
        let chorded = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        if key.kind != KeyEventKind::Release && !chorded {
            app.handle_input(RawInput::Text { ch }, now);
        }
    }

    // Native action of Tab: move between views
    if disposition == KeyDisposition::PassThrough && key.kind == KeyEventKind::Press {
        match key.code {
            TermKey::BackTab => app.prev_view(now),
            TermKey::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.prev_view(now),
            TermKey::Tab => app.next_view(now),
            _ => {}
        }
    }
}

fn translate_mouse(mouse: MouseEvent) -> Option<RawInput> {
    let (x, y) = (mouse.column as i32, mouse.row as i32);
    let input = match mouse.kind {
        MouseEventKind::Down(button) => RawInput::PointerDown {
            x,
            y,
            button: translate_button(button),
        },
        MouseEventKind::Up(button) => RawInput::PointerUp {
            x,
            y,
            button: translate_button(button),
        },
        MouseEventKind::Moved | MouseEventKind::Drag(_) => RawInput::PointerMove { x, y },
        _ => return None,
    };
    Some(input)
}

fn translate_button(button: TermButton) -> MouseButton {
    match button {
        TermButton::Left => MouseButton::Left,
        TermButton::Right => MouseButton::Right,
        TermButton::Middle => MouseButton::Middle,
    }
}

fn translate_key(key: KeyEvent) -> Option<RawInput> {
    let code = KeyCode::from_terminal(key.code)?;
    let input = match key.kind {
        KeyEventKind::Press => RawInput::KeyDown { code, repeat: false },
        KeyEventKind::Repeat => RawInput::KeyDown { code, repeat: true },
        KeyEventKind::Release => RawInput::KeyUp { code },
    };
    Some(input)
}

/// Screen regions shared by drawing and target placement
struct Panes {
    tabs: Rect,
    main: Rect,
    results: Rect,
    side: Rect,
    status: Rect,
}

impl Panes {
    fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tab bar
                Constraint::Min(10),   // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        Self {
            tabs: rows[0],
            main: rows[1],
            results: columns[0],
            side: columns[1],
            status: rows[2],
        }
    }
}

fn draw(frame: &mut Frame, app: &App, colors: ThemeColors) {
    let panes = Panes::split(frame.area());

    let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
    frame.render_widget(TabBar::new(&tab_names, app.view.index(), colors), panes.tabs);

    if app.view == AppView::Help {
        frame.render_widget(HelpPanel::new(colors), panes.main);
    } else {
        let results = app.current_results();
        let title = app.current_tool().map(|tool| tool.name()).unwrap_or_default();
        frame.render_widget(ResultsPanel::new(&results, title, colors), panes.results);

        if let Some(chart) = app.chart() {
            frame.render_widget(SeriesChart::new(&chart, colors), panes.side);
        } else {
            match app.view {
                AppView::Rollover => {
                    let pressed = app.rollover_test.current_pressed();
                    frame.render_widget(KeyboardVisual::new(&pressed, colors), panes.side);
                }
                AppView::Precision => {
                    let target = app.precision_test.current_target().map(|t| (t.x, t.y));
                    frame.render_widget(TargetPanel::new(target, colors), panes.side);
                }
                AppView::Typing => {
                    let panel =
                        TypingPanel::new(app.typing_test.prompt(), app.typing_test.typed(), colors);
                    frame.render_widget(panel, panes.side);
                }
                _ => {}
            }
        }
    }

    let elapsed = app.elapsed_formatted(Instant::now());
    let status = StatusBar::new(app.view.name(), &elapsed, app.total_events, colors)
        .message(app.get_status());
    frame.render_widget(status, panes.status);
}
