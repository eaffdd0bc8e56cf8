#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use monkeyssh_shell::app::keep_alive::ShellKeepAliveBackend;
use monkeyssh_shell::app::proxy::EventProxy;
use monkeyssh_shell::app::{self, commands, events::UserEvent, launch, shortcuts, state::AppState};
use monkeyssh_shell::config::{self, ShellConfig};
use monkeyssh_shell::platform;
use monkeyssh_shell::utils::logging;
use std::sync::{Arc, Mutex};
use tao::{
    event::{Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
    keyboard::ModifiersState,
    window::WindowBuilder,
};
use wry::{PageLoadEvent, WebViewBuilder};

#[tokio::main]
async fn main() {
    // Logging comes first so config loading can report problems.
    let log_filter = logging::init();

    let initial_config = ShellConfig::load().unwrap_or_else(|e| {
        tracing::error!("Failed to load config, using defaults: {:#}", e);
        ShellConfig::default()
    });
    log_filter.apply_configured(&initial_config.log_filter);

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let (width, height) = initial_config.window_size;
    let (pos_x, pos_y) = initial_config.window_position;

    let menu_proxy = proxy.clone();
    platform::prepare_menus(app::APP_NAME, move || {
        EventProxy::send_event(&menu_proxy, UserEvent::DisconnectRequested);
    });

    let window = WindowBuilder::new()
        .with_title(app::window_title(None))
        .with_inner_size(tao::dpi::LogicalSize::new(width, height))
        .with_position(tao::dpi::LogicalPosition::new(pos_x, pos_y))
        .with_min_inner_size(tao::dpi::LogicalSize::new(480, 360))
        .build(&event_loop)
        .expect("Failed to build Window");

    let runtime_url = initial_config.runtime_url.clone();
    let backend = Box::new(ShellKeepAliveBackend::new(proxy.clone()));
    let state = Arc::new(Mutex::new(AppState::new(initial_config, backend)));

    // Cold start: a bundle passed on the command line waits in the slot until
    // the runtime page has loaded and the transfer channel is bound.
    let launch_files = launch::incoming_files_from_args(std::env::args_os().skip(1));
    if !launch_files.is_empty() {
        commands::open_incoming_files(&launch_files, &state);
    }

    let ipc_handler_state = state.clone();
    let ipc_handler_proxy = proxy.clone();
    let ipc_handler = move |message: String| {
        app::handle_ipc_message(message, ipc_handler_proxy.clone(), ipc_handler_state.clone());
    };

    let page_load_state = state.clone();
    let page_load_proxy = proxy.clone();
    let page_load_handler = move |event: PageLoadEvent, url: String| {
        app::handle_page_load(event, &url, &page_load_proxy, &page_load_state);
    };

    tracing::info!("Loading application runtime from {}", runtime_url);
    let webview = WebViewBuilder::new(&window)
        .with_url(&runtime_url)
        .with_initialization_script(app::channels::BRIDGE_SCRIPT)
        .with_ipc_handler(ipc_handler)
        .with_on_page_load_handler(page_load_handler)
        .with_devtools(cfg!(debug_assertions))
        .build()
        .expect("Failed to build WebView");

    let mut modifiers = ModifiersState::empty();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                tracing::info!("Shell initialized.");
            }
            Event::Opened { urls } => {
                let files = launch::incoming_files_from_urls(urls);
                commands::open_incoming_files(&files, &state);
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Focused(false) => {
                    commands::enter_background(proxy.clone(), &state);
                }
                WindowEvent::Focused(true) => {
                    commands::enter_foreground(&state);
                }
                WindowEvent::ModifiersChanged(changed) => {
                    modifiers = changed;
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if shortcuts::is_disconnect_shortcut(&event.physical_key, event.state, modifiers) {
                        commands::request_disconnect(&proxy, &state);
                    }
                }
                WindowEvent::CloseRequested => {
                    tracing::info!("Close requested. Shutting down shell...");
                    commands::shutdown(&state);

                    let mut state_guard = state.lock().unwrap();
                    let size = window.inner_size().to_logical::<f64>(window.scale_factor());
                    let position = window.outer_position().unwrap_or_default();
                    state_guard.config.window_size = (size.width, size.height);
                    state_guard.config.window_position = (position.x.into(), position.y.into());
                    if let Err(e) = config::settings::save_config(&state_guard.config, None) {
                        tracing::error!("Failed to save config on exit: {}", e);
                    }
                    *control_flow = ControlFlow::Exit;
                }
                _ => (),
            },
            Event::UserEvent(user_event) => {
                app::handle_user_event(user_event, &webview, &window, &proxy, &state);
            }
            _ => (),
        }
    });
}
