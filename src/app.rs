use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tracing::{debug, error, info, warn};

use crate::booking::catalog::{self, CAR_TYPES, REPAIR_SERVICES};
use crate::booking::model::Field;
use crate::booking::{BookingService, UpdateResult};
use crate::cli::Args;
use crate::commands::Command;
use crate::config::{self, GlobalAction, KeyResolver};
use crate::theme::{self, ThemeInfo};
use crate::tui::{Event, Tui};
use crate::ui::HintBar;

const FRAME_RATE: f64 = 60.0;
const TICK_RATE: f64 = 4.0;

pub struct App {
    service: BookingService,
    hint_bar: HintBar,
    resolver: Arc<KeyResolver>,
    theme: ThemeInfo,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(service: BookingService, resolver: Arc<KeyResolver>, theme: ThemeInfo) -> Self {
        Self {
            service,
            hint_bar: HintBar::new(Arc::clone(&resolver)),
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
        }
    }

    /// Preselect the fields named on the command line.
    pub fn apply_cli_args(&mut self, args: &Args) -> Result<()> {
        if let Some(name) = &args.car_type {
            let value = catalog::resolve(CAR_TYPES, name)?;
            info!(%value, "Preselecting car type");
            self.service.preselect(Field::CarType, value);
        }
        if let Some(name) = &args.service {
            let value = catalog::resolve(REPAIR_SERVICES, name)?;
            info!(%value, "Preselecting repair service");
            self.service.preselect(Field::RepairService, value);
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.update();

        while let Some(event) = tui.next_event().await {
            self.handle_event(&mut tui, event)?;
            self.update();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Init => debug!("Terminal ready"),
            Event::Quit => self.should_quit = true,
            Event::Tick => self.service.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => {
                self.service.handle_mouse(mouse)?;
            }
            Event::Error(e) => warn!(error = %e, "Terminal input error"),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.service.handle_key(key)? {
            return Ok(());
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Theme) {
            self.cycle_theme();
        }
        Ok(())
    }

    fn cycle_theme(&mut self) {
        self.theme = theme::next_theme(self.theme.name);
        info!(theme = self.theme.name, "Switched theme");
        if let Err(e) = config::save_theme(self.theme.name) {
            warn!(error = %e, "Failed to save theme");
        }
    }

    /// Drain the service queue and spawn whatever commands it returns.
    fn update(&mut self) {
        if let UpdateResult::Commands(commands) = self.service.update() {
            for command in commands {
                Self::spawn_command(command);
            }
        }
    }

    fn spawn_command(command: Box<dyn Command>) {
        let name = command.name();
        debug!(command = %name, "Spawning command");
        tokio::spawn(async move {
            if let Err(e) = command.execute().await {
                error!(command = %name, error = %e, "Command failed");
            }
        });
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let theme = self.theme.theme;
        let keybindings = self.service.keybindings();
        tui.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(theme.base())), area);

            let [main, hints] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            self.service.render(frame, main, &theme);
            self.hint_bar.render(frame, hints, &theme, &keybindings);
        })?;
        Ok(())
    }
}
