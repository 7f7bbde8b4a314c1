mod fixture;

mod layout;
