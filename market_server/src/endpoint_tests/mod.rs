mod auth;
mod cart;
mod helpers;
mod orders;
