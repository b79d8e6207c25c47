//! Prints the polar response of each microphone pattern at a few
//! frequencies, plus the SNR improvement against rear noise.

use echolab::directivity::{PolarPattern, polar_sweep};

fn main() {
    for pattern in PolarPattern::ALL {
        println!("== {} ==", pattern);
        for frequency in [250.0, 1000.0, 8000.0] {
            let points = polar_sweep(pattern, frequency, 30);
            let row: Vec<String> = points
                .iter()
                .map(|(angle, db)| format!("{:>3.0}°:{:6.1}", angle, db))
                .collect();
            println!("{:>6.0} Hz  {}", frequency, row.join("  "));
            println!(
                "          SNR gain vs rear noise: +{:.1} dB",
                pattern.snr_improvement_db(frequency, 180.0)
            );
        }
    }
}
