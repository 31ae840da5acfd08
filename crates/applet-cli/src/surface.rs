//! Terminal surface — prints cards, shows spinners while the channel works.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use applet_core::{
    ActionInvoker, AppletCard, InvocationContext, LoginPopup, OverlayStyle, ProgressOverlay,
    Surface, WindowGeometry,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::render;

/// Nominal screen the login popup is centered on; a terminal has no window.
const SCREEN: WindowGeometry = WindowGeometry {
    screen_x: 0,
    screen_y: 0,
    outer_width: 1280,
    outer_height: 800,
};

pub struct TerminalSurface {
    /// Print nothing but spinners; used with `--output json`.
    quiet: bool,
    spinners: Mutex<HashMap<uuid::Uuid, ProgressBar>>,
    invoker: Mutex<Option<ActionInvoker>>,
}

impl TerminalSurface {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinners: Mutex::new(HashMap::new()),
            invoker: Mutex::new(None),
        }
    }

    /// Invoker of the card currently on screen.
    pub fn invoker(&self) -> Option<ActionInvoker> {
        self.invoker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Surface for TerminalSurface {
    fn mount(&self, card: &AppletCard, invoker: ActionInvoker) -> Result<(), String> {
        if !self.quiet {
            render::print_card(card);
        }
        *self.invoker.lock().unwrap_or_else(PoisonError::into_inner) = Some(invoker);
        Ok(())
    }

    fn attach_overlay(&self, overlay: &ProgressOverlay) {
        let message = match (&overlay.style, overlay.context) {
            (OverlayStyle::Message(text), _) => text.clone(),
            (OverlayStyle::Spinner { .. }, InvocationContext::AutoRefresh) => "Refreshing...".into(),
            (OverlayStyle::Spinner { .. }, InvocationContext::UserInteraction) => {
                "Waiting for the channel...".into()
            }
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));

        self.spinners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(overlay.id, spinner);
    }

    fn detach_overlay(&self, overlay: &ProgressOverlay) {
        let spinner = self
            .spinners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&overlay.id);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    fn alert(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("\n  {} {}:", "💬".to_string(), "Channel".green().bold());
        for line in message.lines() {
            println!("    {line}");
        }
        println!();
    }

    fn window(&self) -> WindowGeometry {
        SCREEN
    }

    fn open_popup(&self, popup: &LoginPopup) {
        if self.quiet {
            return;
        }
        println!("\n  {} Sign-in required.", "🔑".to_string());
        println!("  {} Open {}", "→".dimmed(), popup.url.as_str().cyan());
        println!("  {} Then run the action again.\n", "→".dimmed());
    }
}
