//! Port selection for the local listener.

use std::net::TcpListener;

/// Returns `preferred` if it can be bound on loopback, otherwise whatever
/// free port the OS hands out.
///
/// The probe listener is dropped before the server binds for real, so
/// another process could in principle grab the port in between — the same
/// window every probe-then-bind dev server accepts.
pub fn select_port(preferred: u16) -> std::io::Result<u16> {
    let listener = match TcpListener::bind(("127.0.0.1", preferred)) {
        Ok(listener) => listener,
        Err(_) => TcpListener::bind(("127.0.0.1", 0))?,
    };
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_when_preferred_port_is_taken() {
        let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let taken = holder.local_addr().unwrap().port();

        let selected = select_port(taken).unwrap();
        assert_ne!(selected, taken);

        // The returned port must actually be bindable.
        TcpListener::bind(("127.0.0.1", selected)).unwrap();
    }

    #[test]
    fn zero_means_os_assigned() {
        let selected = select_port(0).unwrap();
        assert_ne!(selected, 0);
        TcpListener::bind(("127.0.0.1", selected)).unwrap();
    }
}
