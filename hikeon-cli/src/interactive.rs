use anyhow::Result;
use hikeon_core::{App, ChatbotController, Command};
use inquire::{InquireError, Select, Text};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Weather,
    Trails,
    Suggest,
    Chat,
    Quit,
}

const MENU: [MenuItem; 5] =
    [MenuItem::Weather, MenuItem::Trails, MenuItem::Suggest, MenuItem::Chat, MenuItem::Quit];

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuItem::Weather => "Get Weather",
            MenuItem::Trails => "Find Nearby Hiking Trails",
            MenuItem::Suggest => "Suggest Locations",
            MenuItem::Chat => "HikeOn AI",
            MenuItem::Quit => "Quit",
        })
    }
}

/// `None` when the user pressed Esc or Ctrl-C.
fn prompt_text(message: &str) -> Result<Option<String>> {
    match Text::new(message).prompt() {
        Ok(text) => Ok(Some(text)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Text for a dispatch outcome; `Err` goes to stderr. Superseded requests render nothing.
fn render(outcome: Option<Result<String>>) -> Option<Result<String, String>> {
    match outcome? {
        Ok(text) => Some(Ok(text)),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "request failed");
            Some(Err(format!("Error: {e:#}")))
        }
    }
}

pub async fn run(app: App) -> Result<()> {
    println!("HikeOn\n");

    loop {
        let choice = match Select::new("What would you like to do?", MENU.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let command = match choice {
            MenuItem::Weather | MenuItem::Trails => {
                let Some(location) = prompt_text("Location:")? else { continue };
                if choice == MenuItem::Weather {
                    Command::FetchWeather { location }
                } else {
                    Command::FindHikingTrails { location }
                }
            }
            MenuItem::Suggest => {
                let Some(input) = prompt_text("Start typing a place:")? else { continue };
                Command::SuggestLocations { input }
            }
            MenuItem::Chat => {
                chat(app.new_chat()).await?;
                continue;
            }
            MenuItem::Quit => break,
        };

        match render(app.dispatcher.dispatch(command).await) {
            Some(Ok(text)) => println!("\n{text}\n"),
            Some(Err(text)) => eprintln!("\n{text}\n"),
            None => {}
        }
    }

    println!("Stay safe and enjoy the outdoors!");
    Ok(())
}

pub async fn chat(mut controller: ChatbotController) -> Result<()> {
    println!("HikeOn AI chatbot. Type /quit to leave.\n");

    while let Some(message) = prompt_text("You:")? {
        if message.trim() == "/quit" {
            break;
        }
        print!("{}", controller.handle_user_message(&message).await);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_labels_match_main_window_buttons() {
        let labels: Vec<String> = MENU.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            ["Get Weather", "Find Nearby Hiking Trails", "Suggest Locations", "HikeOn AI", "Quit"]
        );
    }

    #[test]
    fn render_outcomes() {
        assert_eq!(render(None), None);
        assert_eq!(render(Some(Ok("Sunny".into()))), Some(Ok("Sunny".to_string())));

        let failed = render(Some(Err(anyhow::anyhow!("no location found for 'Nowhere12345'"))));
        assert_eq!(failed, Some(Err("Error: no location found for 'Nowhere12345'".to_string())));
    }
}
