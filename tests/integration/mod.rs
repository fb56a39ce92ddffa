mod idle_disconnect;
mod session_lifecycle;
