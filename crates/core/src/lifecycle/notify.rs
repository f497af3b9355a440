//! sd-notify wrappers. Failures are ignored: outside systemd there is no socket.

use sd_notify::NotifyState;

fn send(state: NotifyState<'_>) {
    let _ = sd_notify::notify(false, &[state]);
}

pub fn sd_ready() {
    send(NotifyState::Ready);
}

pub fn sd_reloading() {
    send(NotifyState::Reloading);
}

pub fn sd_stopping() {
    send(NotifyState::Stopping);
}
