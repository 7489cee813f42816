mod composer;
mod dialog;
mod footer;
mod header;
mod help;
mod toast;

pub use composer::ComposerBox;
pub use dialog::{Dialog, DialogButton, DialogIntent, DialogResult, DialogState, DialogTone};
pub use footer::Footer;
pub use header::Header;
pub use help::HelpModal;
pub use toast::{truncate_chars, Toast, ToastLevel, ToastManager};
