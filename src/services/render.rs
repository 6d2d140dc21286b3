use crate::domain::mail::OutgoingMail;
use crate::domain::submission::Submission;
use maud::html;

const ACCENT: &str = "#F5B041";
const HEADING: &str = "color: #2C3E50;";
const FOOTER: &str =
    "margin-top: 20px; padding-top: 20px; border-top: 1px solid #BDC3C7; color: #888; font-size: 12px;";

/// Renders the owner notification for a submission.
///
/// All submitted text is HTML-escaped; line breaks in the message become `<br>`.
#[must_use]
pub fn render(submission: &Submission) -> OutgoingMail {
    let message_box =
        format!("background-color: #ffffff; padding: 20px; border-left: 4px solid {ACCENT}; margin: 20px 0;");
    let markup = html! {
        div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;" {
            h2 style=(format!("{HEADING} border-bottom: 2px solid {ACCENT}; padding-bottom: 10px;")) {
                "New Contact Form Message"
            }
            div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;" {
                p { strong style=(HEADING) { "Name:" } " " (submission.name()) }
                p { strong style=(HEADING) { "Email:" } " " (submission.email()) }
                p { strong style=(HEADING) { "Phone:" } " " (submission.phone()) }
                p { strong style=(HEADING) { "Date:" } " " (submission.display_timestamp()) }
            }
            div style=(message_box) {
                p { strong style=(HEADING) { "Message:" } }
                p style="color: #555; line-height: 1.6;" {
                    @for (i, line) in submission.message().split('\n').enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
            div style=(FOOTER) {
                p { "This message was sent from your portfolio contact form." }
            }
        }
    };

    OutgoingMail {
        subject: format!("New Contact Form Message from {}", submission.name()),
        html: markup.into_string(),
        reply_to: submission.email().to_string(),
    }
}
