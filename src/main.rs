//! Walkthrough of the library system: cataloguing, lending, competing
//! reservations, promotion, completion and persistence.

use library_system::{
    LibraryError, ReservationRegistry,
    book::BookShelf,
    loan::LoanDesk,
    observers::{NotificationService, TransitionLogger},
    user::UserRoster,
};

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), LibraryError> {
    println!("=== Library System Demo ===\n");

    let mut roster = UserRoster::new();
    let mut shelf = BookShelf::new();
    let mut desk = LoanDesk::new();
    let mut registry = ReservationRegistry::new();
    registry.register_observer(Box::new(TransitionLogger));
    registry.register_observer(Box::new(NotificationService));

    println!("--- Registering users and cataloguing books ---");
    let jan = roster.add_user("Jan Kowalski", "jan@example.com")?;
    let anna = roster.add_user("Anna Nowak", "anna@example.com")?;
    let piotr = roster.add_user("Piotr Wiśniewski", "piotr@example.com")?;
    let lotr = shelf.add_book("Władca Pierścieni", "J.R.R. Tolkien", "9788328705141", 1954)?;
    let hobbit = shelf.add_book("Hobbit", "J.R.R. Tolkien", "9788328704442", 1937)?;
    shelf.add_category("Fantasy")?;
    shelf.assign_category(lotr, "Fantasy")?;
    shelf.assign_category(hobbit, "Fantasy")?;
    println!(
        "{} users registered, {} books catalogued, Fantasy shelf holds {:?}",
        roster.users().len(),
        shelf.books().len(),
        shelf.books_in_category("Fantasy")?
    );

    println!("\n--- Jan borrows the book ---");
    let loan = desk.loan_book(&roster, &mut shelf, jan, lotr)?;
    println!("Loan {loan} opened, book available: {}", shelf.get(lotr)?.available);

    println!("\n--- Anna and Piotr reserve the borrowed book ---");
    let anna_hold = registry.reserve_book(&roster, &shelf, anna, lotr)?;
    let piotr_hold = registry.reserve_book(&roster, &shelf, piotr, lotr)?;
    println!(
        "Anna is position {}, Piotr is position {}",
        registry.position_in_queue(anna_hold)?,
        registry.position_in_queue(piotr_hold)?
    );

    // Reserving a book that sits on the shelf is refused outright.
    match registry.reserve_book(&roster, &shelf, anna, hobbit) {
        Err(err) => println!("Reserving the Hobbit failed as expected: {err}"),
        Ok(_) => println!("Unexpected: the Hobbit should not be reservable"),
    }

    println!("\n--- Jan returns the book ---");
    let returned = desk.return_book(&mut shelf, loan)?;
    if let Some(promoted) = registry.book_returned(returned) {
        let hold = registry.get_reservation(promoted)?;
        println!(
            "Reservation {promoted} is ready for pickup until {}",
            hold.expiry_date.map_or_else(|| "never".to_string(), |e| e.to_rfc3339())
        );
    }

    println!("\n--- Anna picks up her reserved copy ---");
    desk.loan_book(&roster, &mut shelf, anna, lotr)?;
    registry.complete_reservation(anna_hold)?;
    println!(
        "Anna's hold: {:?}, Piotr now at position {}",
        registry.get_reservation(anna_hold)?.status,
        registry.position_in_queue(piotr_hold)?
    );

    println!("\n--- Expiry sweep (nothing due yet) ---");
    let expired = registry.check_expired_reservations();
    println!("Expired holds: {expired:?}");

    println!("\n--- Saving and restoring the registry ---");
    let path = std::env::temp_dir().join("library-system-demo.json");
    registry.save_to_file(&path)?;
    let restored = ReservationRegistry::load_from_file(&path)?;
    println!(
        "Restored {} reservations, Piotr still at position {}",
        restored.list_reservations(None).len(),
        restored.position_in_queue(piotr_hold)?
    );

    println!("\n=== Demo complete ===");
    Ok(())
}
