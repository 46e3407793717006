use ddfloat::DDFloat;

///! Prints a small table of special function values.
///!  cargo run --example special_values --release

fn main() {
    println!("{:>6} {:>40} {:>40}", "x", "erf(x)", "erfc(x)");
    for i in 0..=12 {
        let x = DDFloat::from_f64(i as f64 * 0.5);
        println!("{:>6} {:>40} {:>40}", x.to_f64(), x.erf(), x.erfc());
    }

    println!();
    println!("{:>6} {:>40} {:>40}", "x", "gamma(x)", "ln_gamma(x)");
    for i in 1..=10 {
        let x = DDFloat::from_f64(i as f64 * 2.5);
        println!("{:>6} {:>40} {:>40}", x.to_f64(), x.gamma(), x.ln_gamma());
    }

    // Find the median of the gamma distribution with shape 3.
    let a = DDFloat::from(3);
    let median = a.inverse_upper_incomplete_gamma(&DDFloat::HALF);
    println!();
    println!("median of Gamma(3) = {}", median);
    println!("Q(3, median)       = {}", a.gamma_q(&median));

    let x = DDFloat::parse("0.3").unwrap_or(DDFloat::NAN);
    for n in [2, 8, 32, 64] {
        match x.legendre_p(n) {
            Ok(p) => println!("P_{}(0.3) = {}", n, p),
            Err(err) => println!("P_{}(0.3): {}", n, err),
        }
    }
}
