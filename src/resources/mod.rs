//! Typed wrappers over the merchant API endpoints.
//!
//! Every method resolves its endpoint, fetches a bearer token from the
//! client's [`TokenManager`](crate::auth::TokenManager) and runs the call
//! through the shared [`Transport`](crate::transport::Transport).

mod customers;
mod payments;

#[cfg(test)]
mod test_fixtures;

pub use customers::{
    CreateCustomer, Customer, CustomerList, Customers, ListCustomers, UpdateCustomer,
};
pub use payments::{
    BankTransferPayment, CardPayment, Charge, MobileMoneyPayment, Payment, PaymentRequest,
    PaymentStatus, Payments, SimulatedOutcome,
};
