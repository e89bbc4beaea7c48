mod checkout;
mod mocks;
mod notifications;
mod orders;
mod products;
