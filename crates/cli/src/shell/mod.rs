mod command;
mod completer;
mod context;
mod highlighter;
mod prompt;

use docscope_core::Site;
use reedline::{
    ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder,
    Reedline, ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::sync::Arc;
use tracing::{info, warn};

use self::command::{ShellCommand, parse_shell_command};
use self::completer::DocscopeCompleter;
use self::context::ShellContext;
use self::highlighter::DocscopeHighlighter;
use self::prompt::DefaultPrompt;

// Shell configuration constants
const SHELL_HISTORY_SIZE: usize = 500;

pub struct ReplServer {
    context: ShellContext,
}

impl ReplServer {
    pub fn new(site: Site, rt_handle: tokio::runtime::Handle) -> Self {
        Self {
            context: ShellContext::new(Arc::new(site), rt_handle),
        }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let site = &self.context.site;
        println!("Site: {}", site.root().display());
        println!(
            "Navigation nodes: {}, hierarchy nodes: {}",
            site.nav().len(),
            site.hierarchy().len()
        );
        for diagnostic in site.diagnostics() {
            warn!("{}", diagnostic);
        }
        println!("Type 'help' for commands.");

        let line_editor = self.setup_line_editor()?;
        self.run_loop(line_editor)
    }

    fn setup_line_editor(&self) -> Result<Reedline, Box<dyn std::error::Error>> {
        let commands = ShellCommand::command_names();

        let completer = Box::new(DocscopeCompleter::new(
            commands.clone(),
            self.context.clone(),
        ));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history_file = dirs::home_dir().map(|mut p| {
            p.push(".docscope");
            p.push("shell");
            let _ = std::fs::create_dir_all(&p);
            p.push("history");
            p
        });

        let history = match history_file {
            Some(file) => FileBackedHistory::with_file(SHELL_HISTORY_SIZE, file)
                .or_else(|_| FileBackedHistory::new(SHELL_HISTORY_SIZE))?,
            None => FileBackedHistory::new(SHELL_HISTORY_SIZE)?,
        };

        let highlighter = Box::new(DocscopeHighlighter::new(commands));

        Ok(Reedline::create()
            .with_history(Box::new(history))
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(
                    nu_ansi_term::Style::new()
                        .italic()
                        .fg(nu_ansi_term::Color::LightGray),
                ),
            ))
            .with_edit_mode(Box::new(Emacs::new(keybindings))))
    }

    fn run_loop(&self, mut line_editor: Reedline) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let prompt = DefaultPrompt::new(self.context.current_page());
            let sig = line_editor.read_line(&prompt);

            match sig {
                Ok(Signal::Success(buffer)) => {
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        break;
                    }

                    match parse_shell_command(trimmed) {
                        Ok(Some(cmd)) => match cmd.execute(&self.context) {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{}", output);
                                }
                                if matches!(cmd, ShellCommand::Clear) {
                                    let _ = line_editor.clear_screen();
                                }
                            }
                            Err(e) => eprintln!("Error: {}", e),
                        },
                        Ok(None) => {} // Help or handled by Clap
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                    println!("Bye!");
                    break;
                }
                x => info!("unhandled shell event: {:?}", x),
            }
        }
        Ok(())
    }
}

/// Run the shell on the calling thread. Must not be called from inside the runtime.
pub fn run(site: Site, rt_handle: tokio::runtime::Handle) -> Result<(), Box<dyn std::error::Error>> {
    ReplServer::new(site, rt_handle).run()
}
