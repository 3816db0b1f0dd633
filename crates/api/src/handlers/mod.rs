pub mod agendas;
pub mod auth;
pub mod management;
pub mod meetings;
