use ddfloat::DDFloat;

///! Prints the built-in constants and checks them against identities.
///!  cargo run --example print_constants --release

fn main() {
    let constants = [
        ("pi", DDFloat::PI),
        ("e", DDFloat::E),
        ("ln 2", DDFloat::LN_2),
        ("ln 10", DDFloat::LN_10),
        ("sqrt 2", DDFloat::SQRT_2),
    ];
    for (name, val) in constants {
        println!("{:>8} = {}", name, val);
        println!("{:>8}   F64: {}", "", val.to_f64());
    }

    // Each constant is also reachable through the functions.
    println!("exp(1)      = {}", DDFloat::ONE.exp());
    println!("ln(2)       = {}", DDFloat::TWO.ln());
    println!("sqrt(2)     = {}", DDFloat::TWO.sqrt());
    println!("gamma(1/2)^2 = {}", DDFloat::HALF.gamma().sqr());
    println!("170!        = {}", DDFloat::from(171).gamma());
}
