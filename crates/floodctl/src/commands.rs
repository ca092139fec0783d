//! Command handlers for floodctl.

use crate::cli::{Cli, Commands};
use crate::client::FloodClient;
use crate::display;
use crate::errors::CtlError;
use floodcare_common::api::{AdviceRequest, AnnouncementRequest, QuickReportRequest, SosRequest};
use floodcare_common::intake::ReportDraft;
use floodcare_common::Coordinates;
use serde::Serialize;
use std::io::{self, BufRead, Write};

fn coordinates(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    Some(Coordinates::new(lat?, lng?))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CtlError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CtlError::InvalidResponse(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn prompt_password() -> Result<String, CtlError> {
    print!("Admin password: ");
    io::stdout().flush().map_err(|e| CtlError::Input(e.to_string()))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CtlError::Input(e.to_string()))?;
    Ok(line.trim().to_string())
}

/// Run one parsed command line
pub async fn run(cli: Cli) -> Result<(), CtlError> {
    let client = FloodClient::new(&cli.server)?;
    let json = cli.json;

    match cli.command {
        Commands::Report { name, phone, dorm, category, lat, lng, message } => {
            let draft = ReportDraft {
                name,
                phone,
                dormitory: dorm,
                message: message.join(" "),
                category,
                location: coordinates(lat, lng),
            };
            let response = client.submit(&draft).await?;
            if json {
                return print_json(&response);
            }
            display::success("ส่งข้อมูลเรียบร้อย เจ้าหน้าที่กำลังตรวจสอบ");
            display::print_report(&response.report);
            if let Some(summary) = &response.summary {
                println!("    {}", summary);
            }
        }

        Commands::Quick { status, name, phone } => {
            let response = client.quick(&QuickReportRequest { status, name, phone }).await?;
            if json {
                return print_json(&response);
            }
            display::success("บันทึกข้อมูลเรียบร้อยครับ");
            display::print_report(&response.report);
        }

        Commands::Sos { lat, lng } => {
            let response = client.sos(&SosRequest { location: coordinates(lat, lng) }).await?;
            if json {
                return print_json(&response);
            }
            display::success("SOS sent, staff have been alerted");
            if let Some(advisory) = &response.advisory {
                display::warning(advisory);
            }
            display::print_report(&response.report);
        }

        Commands::Queue { pending } => {
            let queue = client.queue().await?;
            if json {
                return print_json(&queue);
            }
            display::print_queue(&queue, pending);
        }

        Commands::Resolve { id } => {
            let response = client.resolve(&id).await?;
            if json {
                return print_json(&response);
            }
            if response.changed {
                display::success(&format!("Report {} resolved", id));
            } else {
                display::warning(&format!("No report with id {}", id));
            }
        }

        Commands::Delete { id } => {
            let response = client.delete_report(&id).await?;
            if json {
                return print_json(&response);
            }
            if response.changed {
                display::success(&format!("Report {} deleted", id));
            } else {
                display::warning(&format!("No report with id {}", id));
            }
        }

        Commands::Announce { title, content, kind } => {
            let announcement = client.announce(&AnnouncementRequest { title, content, kind }).await?;
            if json {
                return print_json(&announcement);
            }
            display::success("ประกาศแล้ว");
            display::print_announcements(std::slice::from_ref(&announcement));
        }

        Commands::Announcements => {
            let response = client.announcements().await?;
            if json {
                return print_json(&response);
            }
            display::print_announcements(&response.announcements);
        }

        Commands::Unannounce { id } => {
            let response = client.delete_announcement(&id).await?;
            if json {
                return print_json(&response);
            }
            if response.changed {
                display::success(&format!("Announcement {} removed", id));
            } else {
                display::warning(&format!("No announcement with id {}", id));
            }
        }

        Commands::Login { password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let response = client.login(&password).await?;
            if json {
                return print_json(&response);
            }
            display::success("Admin session opened");
        }

        Commands::Logout => {
            let response = client.logout().await?;
            if json {
                return print_json(&response);
            }
            display::success("Admin session closed");
        }

        Commands::Sync => {
            let response = client.sync().await?;
            if json {
                return print_json(&response);
            }
            display::success(&display::describe_sync(&response));
        }

        Commands::Advise { message } => {
            let request = AdviceRequest { history: Vec::new(), message: message.join(" ") };
            let response = client.advise(&request).await?;
            if json {
                return print_json(&response);
            }
            println!("{}", response.reply);
        }

        Commands::Health => {
            let health = client.health().await?;
            if json {
                return print_json(&health);
            }
            display::print_health(&health, client.base_url());
        }
    }

    Ok(())
}
