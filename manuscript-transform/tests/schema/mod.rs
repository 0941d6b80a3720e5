mod categories;
mod citations;
mod grammar;
